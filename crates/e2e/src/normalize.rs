//! Text normalization for tolerant output comparison
//!
//! Only whitespace is touched. Case, script and Unicode composition are left
//! exactly as the page produced them.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s([,.!?])").unwrap());

/// Canonicalize a possibly-absent string for comparison.
///
/// Collapses whitespace runs to one space, drops the space in front of
/// `,` `.` `!` `?`, and trims both ends. `None` normalizes to `""`.
pub fn normalize_text(text: Option<&str>) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text.unwrap_or_default(), " ");
    let tightened = SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1");
    tightened.trim().to_string()
}

pub fn normalize_str(text: &str) -> String {
    normalize_text(Some(text))
}
