//! Input/expected case tables
//!
//! The built-in table is the fixed sequence the live test runs. Extra
//! tables can be written as YAML:
//!
//! ```yaml
//! name: greetings
//! cases:
//!   - input: ingu vaa
//!     expected: இங்கு வா
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::page::contains_tamil;

/// One typed input and the text expected somewhere in the settled output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(default)]
    pub expected: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
        }
    }

    /// True when `expected` is a description rather than literal Tamil output
    pub fn has_placeholder_expected(&self) -> bool {
        !contains_tamil(&self.expected)
    }
}

/// An ordered, named list of cases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseTable {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub cases: Vec<TestCase>,
}

fn case(input: &str, expected: &str) -> TestCase {
    TestCase::new(input, expected)
}

impl CaseTable {
    /// The sequential positive/negative functional table
    pub fn builtin() -> Self {
        Self {
            name: "tamil-transliteration-sequential".to_string(),
            description: "Tamil Transliteration - Sequential Positive Tests".to_string(),
            cases: builtin_cases(),
        }
    }

    /// Parse a case table from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let table: Self = serde_yaml::from_str(yaml)?;
        if table.cases.is_empty() {
            return Err(E2eError::SpecParse(format!("table '{}' has no cases", table.name)));
        }
        Ok(table)
    }

    /// Parse a case table from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load one file, or every YAML table under a directory in path order
    pub fn load_all(path: &Path) -> E2eResult<Vec<Self>> {
        if path.is_file() {
            return Ok(vec![Self::from_file(path)?]);
        }

        let mut entries: Vec<_> = walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        entries.sort();

        entries.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Cases with their 1-based table position, optionally narrowed to one
    /// position or to inputs containing `filter`
    pub fn select(&self, index: Option<usize>, filter: Option<&str>) -> Vec<(usize, &TestCase)> {
        self.cases
            .iter()
            .enumerate()
            .map(|(i, case)| (i + 1, case))
            .filter(|(number, _)| index.map_or(true, |wanted| *number == wanted))
            .filter(|(_, case)| filter.map_or(true, |f| case.input.contains(f)))
            .collect()
    }
}

fn builtin_cases() -> Vec<TestCase> {
    vec![
        case("avan nalaiku pokamataan", "அவன் நாளைக்கு போகமாட்டான்"),
        case("naan nalaiku kadaiku povean", "நான் நாளைக்கு கடைக்கு போவேன்"),
        case("naan vakuppil illai", "நான் வகுப்பில் இல்லை"),
        case("avan nalaiku varamataan", "அவன் நாளைக்கு வரமாட்டான்"),
        case("naan netru parthen", "நான் நேற்று பார்த்தேன்"),
        case("naan poga thevai illai", "நான் போக தேவை இல்லை"),
        case("avan kovil ponaan appuram veetuku vandhaan", "அவன் கோவில் போனான் அப்புறம் வீட்டுக்கு வந்தான்"),
        case("veetil summa iruthaalum naan sutha pogala", "வீட்டில் சும்மா இருந்தாலும் நான் சுத்த போகல"),
        case("avan enga vara ?", "அவன் எங்க வர ?"),
        case("ingu vaa", "இங்கு வா"),
        case("nanbargal nalaiku varanga", "நண்பர்கள் நாளைக்கு வராங்க"),
        case("avarkal paadasaalai poranga", "அவர்கள் பாடசாலை போறாங்க"),
        case("paadasaalai  irandu manikku mudiyum", "பாடசாலை இரண்டு மணிக்கு முடியும்"),
        case("sari, road side nillu varen", "சரி, ரோடு  சைடு நில்லு வரேன்"),
        case("romba romba sandhoshamaa aa irukku", "ரொம்ப ரொம்ப சந்தோஷமா ஆ இருக்கு"),
        case("enasollugireergal", "எனசொல்லுகிறீர்கள்"),
        case("avan bike start pannuran", "அவன் பைக் ஸ்டார்ட் பண்ணுறன்"),
        case("vellam paaiuthu naan varala", "வெள்ளம் பாயுது நான் வரல"),
        case("naan thuka poren", "நான் துக்க போறேன்"),
        case("kamal varaan kovilukku poraan", "கமல் வாரான் கோவிலுக்கு போறான்"),
        case("avan indha website romba neram use pannitu irukkran.idhu pala vishayathuku help aagudhu athoda vraivaga saijalpaduthu", "அவன் இந்த வெப்சைட் ரொம்ப நேரம் உஸ் பண்ணிட்டு இருக்கிறான்.இது பல விஷயத்துக்கு ஹெல்ப் ஆகுது அதோட விரைவாக ஷஜல்படுத்து"),
        case("antha velai mudichutu vaa", "அந்த வேலை முடிச்சுட்டு வா"),
        case("avan than atha senjaan", "அவன் தன அத செஞ்சான்"),
        case("naan entaiku varanuma", "நான் இண்டைக்கு வரணுமா"),
        case("keels, Jung man", "No tamil conversion with validation message"),
        case("cxvcbcvncvb", "No tamil conversion with validation message"),
        case("643568", "No tamil conversion with validation message "),
        case("*&#@$&@()", "No tamil conversion with validation message "),
        case("veedulaakalaila", "Correct tamil sentence with proper word separation"),
        case("avan email potaan", "tamil convention"),
        case("enaku thips RS 345 kidaikuma", "currancy symbol and  tamil letter transalation"),
        case("*clear the input field", "Tamil output should clearly represent a future tense sentence"),
        case("naan veeda pokala", ""),
    ]
}
