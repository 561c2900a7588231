//! Word-by-word keystroke entry

use tracing::debug;

use crate::config::TypingConfig;
use crate::error::E2eResult;
use crate::page::BrowserPage;

/// Type `sentence` one word at a time, each followed by a space.
///
/// Empty words (from doubled spaces) are skipped. After the last word the
/// page gets `settle` to finish any trailing transliteration. The field is
/// expected to be empty already.
pub async fn type_with_spaces<P: BrowserPage + ?Sized>(
    page: &mut P,
    selector: &str,
    sentence: &str,
    typing: &TypingConfig,
) -> E2eResult<()> {
    for word in sentence.split(' ') {
        if word.trim().is_empty() {
            continue;
        }
        debug!("Typing {:?}", word);
        page.type_text(selector, &format!("{} ", word), typing.keystroke_delay())
            .await?;
    }

    page.wait_for_timeout(typing.settle()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::RecordingPage;

    #[tokio::test]
    async fn test_types_each_word_with_trailing_space() {
        let mut page = RecordingPage::default();
        type_with_spaces(&mut page, "#f", "naan vakuppil illai", &TypingConfig::default())
            .await
            .unwrap();

        assert_eq!(
            page.calls,
            vec![
                "type:naan :120",
                "type:vakuppil :120",
                "type:illai :120",
                "sleep:450",
            ]
        );
    }

    #[tokio::test]
    async fn test_skips_empty_words() {
        let mut page = RecordingPage::default();
        type_with_spaces(&mut page, "#f", " paadasaalai  irandu ", &TypingConfig::default())
            .await
            .unwrap();

        assert_eq!(page.calls, vec!["type:paadasaalai :120", "type:irandu :120", "sleep:450"]);
    }

    #[tokio::test]
    async fn test_blank_sentence_only_settles() {
        let mut page = RecordingPage::default();
        let typing = TypingConfig { keystroke_delay_ms: 10, settle_ms: 20 };
        type_with_spaces(&mut page, "#f", "   ", &typing).await.unwrap();

        assert_eq!(page.calls, vec!["sleep:20"]);
    }

    #[tokio::test]
    async fn test_never_clears_the_field() {
        let mut page = RecordingPage::default();
        type_with_spaces(&mut page, "#f", "ingu vaa", &TypingConfig::default())
            .await
            .unwrap();

        assert!(page.calls.iter().all(|c| !c.starts_with("fill") && !c.starts_with("press")));
    }
}
