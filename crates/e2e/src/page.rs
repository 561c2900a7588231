//! Browser page abstraction
//!
//! Everything the harness does to the remote page goes through
//! [`BrowserPage`]. The live implementation is
//! [`PlaywrightHandle`](crate::playwright::PlaywrightHandle); tests drive the
//! same code with an in-memory page.

use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Tamil Unicode block
pub const TAMIL_BLOCK: std::ops::RangeInclusive<char> = '\u{0B80}'..='\u{0BFF}';

/// Navigation milestone to wait for after `goto`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    DomContentLoaded,
    Load,
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::Load => "load",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

/// A condition on a field's current value.
///
/// `js` is a function source `(selector) => boolean` evaluated inside the
/// page; `matches` is the same check applied to an already-read value.
#[derive(Debug, Clone, Copy)]
pub struct FieldPredicate {
    pub name: &'static str,
    pub js: &'static str,
    pub matches: fn(&str) -> bool,
}

/// Field value contains at least one Tamil code point
pub const TAMIL_PRESENT: FieldPredicate = FieldPredicate {
    name: "tamil-present",
    js: r"(selector) => {
  const el = document.querySelector(selector);
  return !!el && /[\u0B80-\u0BFF]/.test(el.value);
}",
    matches: contains_tamil,
};

pub fn contains_tamil(text: &str) -> bool {
    text.chars().any(|c| TAMIL_BLOCK.contains(&c))
}

/// Operations the harness performs on the page under test
#[async_trait]
pub trait BrowserPage: Send {
    /// Open `url` and wait for `state`
    async fn goto(&mut self, url: &str, state: LoadState) -> E2eResult<()>;

    /// Wait until the element is visible
    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> E2eResult<()>;

    /// Replace the field's value programmatically
    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    /// Send keystrokes one character at a time
    async fn type_text(&mut self, selector: &str, text: &str, delay: Duration) -> E2eResult<()>;

    /// Read the field's current value
    async fn input_value(&mut self, selector: &str) -> E2eResult<String>;

    /// Block until `predicate` holds for the field. `None` waits forever.
    async fn wait_for_predicate(
        &mut self,
        selector: &str,
        predicate: &FieldPredicate,
        timeout: Option<Duration>,
    ) -> E2eResult<()>;

    async fn click(&mut self, selector: &str) -> E2eResult<()>;

    /// Press a key chord on the page keyboard, e.g. `Control+A`
    async fn press(&mut self, key: &str) -> E2eResult<()>;

    /// Page-scoped pause
    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()>;

    /// Release the browser
    async fn close(&mut self) -> E2eResult<()>;
}
