//! Error types for E2E testing

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Bridge protocol error: {0}")]
    Protocol(String),

    #[error("Element not visible: {selector} (waited {timeout:?})")]
    ElementNotVisible { selector: String, timeout: Duration },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("{label} failed: \"{input}\" | Output: \"{output}\" | Expected: \"{expected}\"")]
    CaseFailed {
        label: String,
        input: String,
        output: String,
        expected: String,
    },

    #[error("{failed} of {total} case(s) failed")]
    CasesFailed { failed: usize, total: usize },

    #[error("No cases matched the selection")]
    NoCasesSelected,

    #[error("Run exceeded the overall timeout of {0:?}")]
    RunTimeout(Duration),

    #[error("Case table parse error: {0}")]
    SpecParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
