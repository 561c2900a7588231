//! Waiting for the transliteration field to settle
//!
//! The remote engine rewrites the field asynchronously and offers no
//! completion event. The harness first waits for any Tamil output at all,
//! then polls until consecutive reads agree.

use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StabilityConfig;
use crate::error::E2eResult;
use crate::page::{BrowserPage, TAMIL_PRESENT};

/// Block until the field holds at least one Tamil character.
///
/// `None` waits without limit.
pub async fn wait_for_tamil<P: BrowserPage + ?Sized>(
    page: &mut P,
    selector: &str,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    debug!("Waiting for Tamil output in {} (timeout: {:?})", selector, timeout);
    page.wait_for_predicate(selector, &TAMIL_PRESENT, timeout).await
}

/// Poll the field until `stable_checks` consecutive reads repeat the
/// previous one, sleeping `gap` between reads.
///
/// After `max_polls` reads without converging, one final read is returned
/// as is.
pub async fn wait_for_stable_value<P: BrowserPage + ?Sized>(
    page: &mut P,
    selector: &str,
    stability: &StabilityConfig,
) -> E2eResult<String> {
    let mut last = String::new();
    let mut same = 0u32;

    for _ in 0..stability.max_polls {
        let value = page.input_value(selector).await?;
        if value == last {
            same += 1;
        } else {
            last = value;
            same = 0;
        }

        if same >= stability.stable_checks {
            debug!("Value settled after {} matching reads: {:?}", same, last);
            return Ok(last);
        }

        page.wait_for_timeout(stability.gap()).await?;
    }

    warn!(
        "{} did not settle within {} reads; using the current value",
        selector, stability.max_polls
    );
    page.input_value(selector).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::RecordingPage;

    fn reads(page: &RecordingPage) -> usize {
        page.reads_taken()
    }

    #[tokio::test]
    async fn test_returns_converged_value() {
        let mut page = RecordingPage::with_reads(&[
            "நாணலைக்கு",
            "நான் நாளைக்கு",
            "நான் நாளைக்கு கடைக்கு",
            "நான் நாளைக்கு கடைக்கு",
            "நான் நாளைக்கு கடைக்கு",
        ]);
        let value = wait_for_stable_value(&mut page, "#f", &StabilityConfig::default())
            .await
            .unwrap();

        assert_eq!(value, "நான் நாளைக்கு கடைக்கு");
        assert_eq!(reads(&page), 5);
    }

    #[tokio::test]
    async fn test_sleeps_gap_between_reads() {
        let mut page = RecordingPage::with_reads(&["a", "a", "a"]);
        wait_for_stable_value(&mut page, "#f", &StabilityConfig::default())
            .await
            .unwrap();

        assert_eq!(
            page.calls,
            vec!["input_value:a", "sleep:250", "input_value:a", "sleep:250", "input_value:a"]
        );
    }

    #[tokio::test]
    async fn test_transient_repeat_resets_counter() {
        let mut page = RecordingPage::with_reads(&["x", "x", "y", "y", "y"]);
        let value = wait_for_stable_value(&mut page, "#f", &StabilityConfig::default())
            .await
            .unwrap();

        assert_eq!(value, "y");
    }

    #[tokio::test]
    async fn test_empty_field_counts_as_stable() {
        let mut page = RecordingPage::with_reads(&[""]);
        let value = wait_for_stable_value(&mut page, "#f", &StabilityConfig::default())
            .await
            .unwrap();

        assert_eq!(value, "");
        assert_eq!(reads(&page), 2);
    }

    #[tokio::test]
    async fn test_never_settling_returns_final_read() {
        let sequence: Vec<String> = (0..60).map(|i| format!("v{}", i)).collect();
        let refs: Vec<&str> = sequence.iter().map(String::as_str).collect();
        let mut page = RecordingPage::with_reads(&refs);

        let value = wait_for_stable_value(&mut page, "#f", &StabilityConfig::default())
            .await
            .unwrap();

        assert_eq!(reads(&page), 41);
        assert_eq!(value, "v40");
    }

    #[tokio::test]
    async fn test_custom_checks_and_cap() {
        let stability = StabilityConfig {
            stable_checks: 1,
            gap_ms: 5,
            max_polls: 3,
            tamil_timeout_ms: None,
        };
        let mut page = RecordingPage::with_reads(&["a", "b", "b"]);
        let value = wait_for_stable_value(&mut page, "#f", &stability).await.unwrap();

        assert_eq!(value, "b");
        assert!(page.calls.contains(&"sleep:5".to_string()));
    }

    #[tokio::test]
    async fn test_wait_for_tamil_uses_tamil_predicate() {
        let mut page = RecordingPage::default();
        wait_for_tamil(&mut page, "#f", None).await.unwrap();

        assert_eq!(page.calls, vec!["wait_for:tamil-present"]);
    }
}
