//! In-memory page with a scripted transliteration engine
//!
//! Each phrase maps to the sequence of values the field shows while the
//! engine works on it. Reads walk that sequence and then keep returning the
//! last frame. Unknown phrases echo the typed Latin text, so waiting for
//! Tamil on them lasts until the timeout, or forever without one.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use translit_e2e::page::{BrowserPage, FieldPredicate, LoadState};
use translit_e2e::{E2eError, E2eResult};

#[derive(Default)]
pub struct ScriptedPage {
    engine: HashMap<String, Vec<String>>,
    typed: String,
    cursor: usize,
    select_all: bool,
    pub url: Option<String>,
    pub events: Vec<String>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the frames shown for `phrase` (space-normalized input)
    pub fn with_frames(mut self, phrase: &str, frames: &[&str]) -> Self {
        self.engine.insert(
            phrase.to_string(),
            frames.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// Script a phrase that settles immediately
    pub fn with_output(self, phrase: &str, output: &str) -> Self {
        self.with_frames(phrase, &[output])
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Every phrase that was typed into the field, in order
    pub fn typed_phrases(&self) -> Vec<String> {
        let mut phrases = Vec::new();
        let mut current = String::new();
        for event in &self.events {
            if let Some(text) = event.strip_prefix("type:") {
                current.push_str(text);
            } else if event.starts_with("fill:") && !current.is_empty() {
                phrases.push(current.trim_end().to_string());
                current.clear();
            }
        }
        if !current.is_empty() {
            phrases.push(current.trim_end().to_string());
        }
        phrases
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn frames(&self) -> Option<&Vec<String>> {
        self.engine.get(self.typed.trim_end())
    }

    fn current_value(&self) -> String {
        match self.frames() {
            Some(frames) if !frames.is_empty() => {
                frames[self.cursor.min(frames.len() - 1)].clone()
            }
            _ => self.typed.clone(),
        }
    }

    fn reset(&mut self) {
        self.typed.clear();
        self.cursor = 0;
    }
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn goto(&mut self, url: &str, state: LoadState) -> E2eResult<()> {
        self.url = Some(url.to_string());
        self.events.push(format!("goto:{}", state.as_str()));
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> E2eResult<()> {
        self.events.push("wait_visible".to_string());
        if self.url.is_none() {
            return Err(E2eError::ElementNotVisible {
                selector: selector.to_string(),
                timeout,
            });
        }
        Ok(())
    }

    async fn fill(&mut self, _selector: &str, value: &str) -> E2eResult<()> {
        self.events.push(format!("fill:{}", value));
        self.reset();
        self.typed.push_str(value);
        Ok(())
    }

    async fn type_text(&mut self, _selector: &str, text: &str, _delay: Duration) -> E2eResult<()> {
        self.events.push(format!("type:{}", text));
        self.typed.push_str(text);
        self.cursor = 0;
        Ok(())
    }

    async fn input_value(&mut self, _selector: &str) -> E2eResult<String> {
        let value = self.current_value();
        self.cursor += 1;
        self.events.push("read".to_string());
        Ok(value)
    }

    async fn wait_for_predicate(
        &mut self,
        selector: &str,
        predicate: &FieldPredicate,
        timeout: Option<Duration>,
    ) -> E2eResult<()> {
        self.events.push(format!("wait_for:{}", predicate.name));

        let hit = match self.frames() {
            Some(frames) => frames.iter().position(|f| (predicate.matches)(f)),
            None => None,
        };
        if let Some(index) = hit {
            self.cursor = index;
            return Ok(());
        }

        // The engine never produces a match: wait it out like the browser would
        match timeout {
            Some(limit) => {
                tokio::time::sleep(limit).await;
                Err(E2eError::Timeout(format!(
                    "{} on {} after {:?}",
                    predicate.name, selector, limit
                )))
            }
            None => std::future::pending().await,
        }
    }

    async fn click(&mut self, _selector: &str) -> E2eResult<()> {
        self.events.push("click".to_string());
        Ok(())
    }

    async fn press(&mut self, key: &str) -> E2eResult<()> {
        self.events.push(format!("press:{}", key));
        match key {
            "Control+A" => self.select_all = true,
            "Backspace" if self.select_all => {
                self.select_all = false;
                self.reset();
            }
            _ => self.select_all = false,
        }
        Ok(())
    }

    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()> {
        self.events.push(format!("sleep:{}", duration.as_millis()));
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.events.push("close".to_string());
        Ok(())
    }
}
