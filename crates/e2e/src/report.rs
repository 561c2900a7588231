//! Per-case console lines and run summaries

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{E2eError, E2eResult};

/// Result of running a single case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// 1-based position in the case table
    pub number: usize,
    pub label: String,
    pub input: String,
    pub expected: String,

    /// Settled field value, or empty when the case errored before reading it
    pub output: String,
    pub passed: bool,

    /// Infrastructure error that stopped the case, if any
    pub error: Option<String>,
}

/// Result of running a case table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteResult {
    pub table: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Cases never reached because an earlier case aborted the run
    pub skipped: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// Turn a finished run into an error when any case failed
    pub fn into_result(self) -> E2eResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(E2eError::CasesFailed {
                failed: self.failed,
                total: self.total,
            })
        }
    }
}

/// Fail a run whose selection matched nothing across all tables
pub fn require_cases(results: &[SuiteResult]) -> E2eResult<usize> {
    match results.iter().map(|r| r.total).sum::<usize>() {
        0 => Err(E2eError::NoCasesSelected),
        total => Ok(total),
    }
}

/// `Pos_Fun_3`-style case label
pub fn case_label(prefix: &str, number: usize) -> String {
    format!("{}_{}", prefix, number)
}

pub fn pass_line(outcome: &CaseOutcome) -> String {
    format!(
        "✅ {}: \"{}\" | Output: \"{}\"",
        outcome.label, outcome.input, outcome.output
    )
}

pub fn fail_line(outcome: &CaseOutcome) -> String {
    let mut line = format!(
        "❌ {} FAILED: \"{}\" | Output: \"{}\" | Expected: \"{}\"",
        outcome.label, outcome.input, outcome.output, outcome.expected
    );
    if let Some(err) = &outcome.error {
        line.push_str(&format!(" | Error: {}", err));
    }
    line
}

/// Print the colored line for a finished case to stdout
pub fn print_outcome(outcome: &CaseOutcome) {
    if outcome.passed {
        println!("{}", pass_line(outcome).green());
    } else {
        println!("{}", fail_line(outcome).red());
    }
}

pub fn log_summary(result: &SuiteResult) {
    let message = format!(
        "{}: {} passed, {} failed, {} skipped of {} ({} ms)",
        result.table, result.passed, result.failed, result.skipped, result.total, result.duration_ms
    );
    if result.success() {
        info!("{}", message);
    } else {
        error!("{}", message);
    }
}
