//! Case runner: navigation, then type / wait / compare / clear per case

use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cases::{CaseTable, TestCase};
use crate::config::{FailurePolicy, HarnessConfig};
use crate::error::{E2eError, E2eResult};
use crate::input::type_with_spaces;
use crate::normalize::normalize_str;
use crate::page::{BrowserPage, LoadState};
use crate::report::{self, CaseOutcome, SuiteResult};
use crate::stability::{wait_for_stable_value, wait_for_tamil};

/// Where a case currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Idle,
    Typing,
    AwaitingTamil,
    Stabilizing,
    Asserted,
    Cleared,
    Aborted,
}

/// Containment check on normalized text
pub fn output_matches(output: &str, expected: &str) -> bool {
    normalize_str(output).contains(&normalize_str(expected))
}

/// Drives one page through a case table
pub struct CaseRunner<P: BrowserPage> {
    page: P,
    config: HarnessConfig,
    state: CaseState,
}

impl<P: BrowserPage> CaseRunner<P> {
    pub fn new(page: P, config: HarnessConfig) -> Self {
        Self {
            page,
            config,
            state: CaseState::Idle,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// State of the most recent case
    pub fn state(&self) -> CaseState {
        self.state
    }

    fn transition(&mut self, number: usize, state: CaseState) {
        debug!("case {}: {:?} -> {:?}", number, self.state, state);
        self.state = state;
    }

    /// Open the target page and wait for the field
    pub async fn open(&mut self) -> E2eResult<()> {
        let target = &self.config.target;
        self.page.goto(&target.url, LoadState::DomContentLoaded).await?;
        self.page
            .wait_visible(&target.selector, target.visible_timeout())
            .await?;
        info!("{} is visible on {}", target.selector, target.url);
        Ok(())
    }

    /// Navigate and run every case in `table` under the overall run timeout
    pub async fn run(&mut self, table: &CaseTable) -> E2eResult<SuiteResult> {
        self.run_selected(table, None, None).await
    }

    /// Like [`run`](Self::run) but narrowed with [`CaseTable::select`]
    pub async fn run_selected(
        &mut self,
        table: &CaseTable,
        index: Option<usize>,
        filter: Option<&str>,
    ) -> E2eResult<SuiteResult> {
        let limit = self.config.run.timeout();
        let run = async {
            self.open().await?;
            let cases = table.select(index, filter);
            if cases.is_empty() {
                warn!(
                    "No case in {} matches index {:?} / filter {:?}",
                    table.name, index, filter
                );
            }
            self.run_cases(&table.name, &cases).await
        };

        match tokio::time::timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => {
                error!("Run exceeded {:?}", limit);
                Err(E2eError::RunTimeout(limit))
            }
        }
    }

    /// Run already-selected cases on an opened page
    pub async fn run_cases(
        &mut self,
        table_name: &str,
        cases: &[(usize, &TestCase)],
    ) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let mut result = SuiteResult {
            table: table_name.to_string(),
            total: cases.len(),
            ..Default::default()
        };

        info!("Running {} case(s) from {}", cases.len(), table_name);

        for (position, (number, case)) in cases.iter().enumerate() {
            let (outcome, infra_error) = match self.run_case(*number, case).await {
                Ok(outcome) => (outcome, None),
                Err(e) => {
                    let outcome = CaseOutcome {
                        number: *number,
                        label: report::case_label(&self.config.run.label_prefix, *number),
                        input: case.input.clone(),
                        expected: case.expected.clone(),
                        output: String::new(),
                        passed: false,
                        error: Some(e.to_string()),
                    };
                    (outcome, Some(e))
                }
            };
            report::print_outcome(&outcome);

            if outcome.passed {
                result.passed += 1;
            } else {
                result.failed += 1;
            }

            if !outcome.passed && self.config.run.failure_policy == FailurePolicy::FailFast {
                self.transition(*number, CaseState::Aborted);
                result.skipped = cases.len() - position - 1;
                result.duration_ms = start.elapsed().as_millis() as u64;
                result.outcomes.push(outcome.clone());
                report::log_summary(&result);

                return Err(infra_error.unwrap_or(E2eError::CaseFailed {
                    label: outcome.label,
                    input: outcome.input,
                    output: outcome.output,
                    expected: outcome.expected,
                }));
            }

            result.outcomes.push(outcome);
            self.clear_field().await?;
            self.transition(*number, CaseState::Cleared);
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        report::log_summary(&result);
        Ok(result)
    }

    /// Type one case, wait for the output to settle and compare
    async fn run_case(&mut self, number: usize, case: &TestCase) -> E2eResult<CaseOutcome> {
        let selector = self.config.target.selector.clone();
        let label = report::case_label(&self.config.run.label_prefix, number);

        self.transition(number, CaseState::Idle);
        if case.has_placeholder_expected() {
            warn!(
                "{}: expected value {:?} is not Tamil text; containment is checked literally",
                label, case.expected
            );
        }

        self.page.fill(&selector, "").await?;

        self.transition(number, CaseState::Typing);
        type_with_spaces(&mut self.page, &selector, &case.input, &self.config.typing).await?;

        self.transition(number, CaseState::AwaitingTamil);
        wait_for_tamil(&mut self.page, &selector, self.config.stability.tamil_timeout()).await?;

        self.transition(number, CaseState::Stabilizing);
        let output = wait_for_stable_value(&mut self.page, &selector, &self.config.stability).await?;

        self.transition(number, CaseState::Asserted);
        let passed = output_matches(&output, &case.expected);

        Ok(CaseOutcome {
            number,
            label,
            input: case.input.clone(),
            expected: case.expected.clone(),
            output,
            passed,
            error: None,
        })
    }

    /// Click the field, select everything and delete it
    async fn clear_field(&mut self) -> E2eResult<()> {
        self.page.click(&self.config.target.selector).await?;
        self.page.press("Control+A").await?;
        self.page.press("Backspace").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::RecordingPage;

    #[test]
    fn test_output_matches_uses_containment() {
        assert!(output_matches("இங்கு வா ", "இங்கு வா"));
        assert!(output_matches("அவன் எங்க வர ?", "அவன் எங்க வர ?"));
        assert!(output_matches("சரி, ரோடு சைடு நில்லு", "சரி, ரோடு  சைடு"));
        assert!(output_matches("anything", ""));
        assert!(!output_matches("நாணலைக்கு", "நான் நாளைக்கு"));
        assert!(!output_matches("643568", "No tamil conversion with validation message "));
    }

    #[tokio::test]
    async fn test_open_navigates_then_waits_for_field() {
        let mut runner = CaseRunner::new(RecordingPage::default(), HarnessConfig::default());
        runner.open().await.unwrap();

        assert_eq!(
            runner.page().calls,
            vec![
                "goto:https://tamil.changathi.com/:domcontentloaded",
                "wait_visible:#transliterateTextarea",
            ]
        );
    }

    #[tokio::test]
    async fn test_single_case_step_order() {
        let mut runner = CaseRunner::new(
            RecordingPage::with_reads(&["இங்கு வா "]),
            HarnessConfig::default(),
        );
        let case = TestCase::new("ingu vaa", "இங்கு வா");
        let result = runner.run_cases("t", &[(1, &case)]).await.unwrap();

        assert_eq!(result.passed, 1);
        assert_eq!(runner.state(), CaseState::Cleared);
        assert_eq!(
            runner.page().calls,
            vec![
                "fill:#transliterateTextarea:",
                "type:ingu :120",
                "type:vaa :120",
                "sleep:450",
                "wait_for:tamil-present",
                "input_value:இங்கு வா ",
                "sleep:250",
                "input_value:இங்கு வா ",
                "sleep:250",
                "input_value:இங்கு வா ",
                "click:#transliterateTextarea",
                "press:Control+A",
                "press:Backspace",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_case_skips_cleanup() {
        let mut runner = CaseRunner::new(
            RecordingPage::with_reads(&["நாணலைக்கு"]),
            HarnessConfig::default(),
        );
        let case = TestCase::new("naan nalaiku", "நான் நாளைக்கு");
        let err = runner.run_cases("t", &[(2, &case)]).await.unwrap_err();

        assert!(matches!(err, E2eError::CaseFailed { ref label, .. } if label == "Pos_Fun_2"));
        assert_eq!(runner.state(), CaseState::Aborted);
        assert!(!runner.page().calls.iter().any(|c| c.starts_with("click")));
    }
}
