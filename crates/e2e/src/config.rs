//! Harness configuration
//!
//! Values come from three layers, lowest precedence first: built-in
//! defaults, an optional TOML file, and `TRANSLIT_E2E_*` environment
//! variables. The test binary applies its CLI flags on top.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::E2eResult;
use crate::playwright::{Browser, PlaywrightConfig};

/// Complete harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Page under test
    pub target: TargetConfig,

    /// Keystroke simulation
    pub typing: TypingConfig,

    /// Output settling
    pub stability: StabilityConfig,

    /// Run-level behavior
    pub run: RunConfig,

    /// Browser launch options
    pub browser: PlaywrightConfig,
}

/// Page under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Transliteration page URL
    pub url: String,

    /// Selector of the transliteration text area
    pub selector: String,

    /// How long the field may take to become visible after navigation
    pub visible_timeout_ms: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "https://tamil.changathi.com/".to_string(),
            selector: "#transliterateTextarea".to_string(),
            visible_timeout_ms: 30_000,
        }
    }
}

impl TargetConfig {
    pub fn visible_timeout(&self) -> Duration {
        Duration::from_millis(self.visible_timeout_ms)
    }
}

/// Keystroke simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Delay between simulated keystrokes
    pub keystroke_delay_ms: u64,

    /// Quiescence period after the last word is typed
    pub settle_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            keystroke_delay_ms: 120,
            settle_ms: 450,
        }
    }
}

impl TypingConfig {
    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Output settling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Consecutive identical reads required to call the value settled
    pub stable_checks: u32,

    /// Gap between reads
    pub gap_ms: u64,

    /// Upper bound on reads before falling back to a final direct read
    pub max_polls: u32,

    /// Timeout for the first Tamil character to appear (0 or absent = unbounded)
    pub tamil_timeout_ms: Option<u64>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            stable_checks: 2,
            gap_ms: 250,
            max_polls: 40,
            tamil_timeout_ms: Some(60_000),
        }
    }
}

impl StabilityConfig {
    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }

    pub fn tamil_timeout(&self) -> Option<Duration> {
        match self.tamil_timeout_ms {
            Some(0) | None => None,
            Some(ms) => Some(Duration::from_millis(ms)),
        }
    }
}

/// What happens after a case fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run on the first failing case, leaving the field as is
    #[default]
    FailFast,
    /// Run every case, clearing the field after each, and report all failures
    CollectAll,
}

/// Run-level behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Ceiling for the whole run
    pub timeout_secs: u64,

    pub failure_policy: FailurePolicy,

    /// Prefix of the per-case label, e.g. `Pos_Fun` gives `Pos_Fun_3`
    pub label_prefix: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            failure_policy: FailurePolicy::FailFast,
            label_prefix: "Pos_Fun".to_string(),
        }
    }
}

impl RunConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `TRANSLIT_E2E_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TRANSLIT_E2E_URL") {
            self.target.url = url;
        }
        if let Some(selector) = lookup("TRANSLIT_E2E_SELECTOR") {
            self.target.selector = selector;
        }
        if let Some(headless) = lookup("TRANSLIT_E2E_HEADLESS") {
            self.browser.headless = !matches!(headless.as_str(), "0" | "false" | "no");
        }
        if let Some(browser) = lookup("TRANSLIT_E2E_BROWSER") {
            self.browser.browser = Browser::from_name(&browser);
        }
    }
}
