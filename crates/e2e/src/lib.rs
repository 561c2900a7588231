//! Tamil Transliteration E2E Harness
//!
//! This crate drives the online Tamil transliteration page in a real browser
//! and checks that typed Latin-script phrases come back as the expected
//! Tamil text:
//! - Controls Playwright through a long-lived node bridge (JSON lines)
//! - Types each phrase word by word, like a person would
//! - Waits for Tamil output, then for the field to stop changing
//! - Compares normalized output by containment and logs a colored line per case
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CaseRunner<P: BrowserPage>                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  open()        goto(url, domcontentloaded) + wait_visible   │
//! │  per case:                                                  │
//! │    fill("")                                                 │
//! │    type_with_spaces()      word + " ", 120 ms/key, 450 ms   │
//! │    wait_for_tamil()        U+0B80..U+0BFF appears           │
//! │    wait_for_stable_value() 2 equal reads, 250 ms gap, ≤ 40  │
//! │    normalize + contains    ✅ / ❌ line                      │
//! │    click, Control+A, Backspace                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PlaywrightHandle ── stdin/stdout JSON ── node + playwright │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cases;
pub mod config;
pub mod error;
pub mod input;
pub mod normalize;
pub mod page;
pub mod playwright;
pub mod report;
pub mod runner;
pub mod stability;

pub use cases::{CaseTable, TestCase};
pub use config::{FailurePolicy, HarnessConfig};
pub use error::{E2eError, E2eResult};
pub use normalize::{normalize_str, normalize_text};
pub use page::{BrowserPage, FieldPredicate, LoadState};
pub use playwright::PlaywrightHandle;
pub use runner::CaseRunner;
