use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::TranslateConfig;
use crate::cue::parse;
use crate::error::{CuelinkError, Result};
use crate::events::{PipelineBus, PipelineEvent};
use crate::segment::{join_halves, segment};
use super::{SegmentTranslator, common};

/// Splits raw timed text in two, translates both halves concurrently and
/// merges them in input order. Either half failing, or a merged reply with
/// no cues, fails the whole call.
pub struct TranslationCoordinator {
    translator: Arc<dyn SegmentTranslator>,
    instructions: String,
    call_timeout: Duration,
    bus: Option<Arc<PipelineBus>>,
}

impl TranslationCoordinator {
    pub fn new(translator: Arc<dyn SegmentTranslator>, config: &TranslateConfig) -> Self {
        Self {
            translator,
            instructions: common::build_instructions(config),
            call_timeout: Duration::from_secs(config.timeout_secs),
            bus: None,
        }
    }

    /// Publish completion and failure on `bus`.
    pub fn with_bus(mut self, bus: Arc<PipelineBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Translate `raw` and return the merged blob.
    pub async fn translate(&self, raw: &str) -> Result<String> {
        let span = info_span!("translation_cycle", cycle = %Uuid::new_v4());
        self.translate_cycle(raw).instrument(span).await
    }

    async fn translate_cycle(&self, raw: &str) -> Result<String> {
        let segments = segment(raw);
        let (first_chars, second_chars) = segments.char_counts();
        info!(
            "Translating {} chars with {} as two segments ({} / {} chars, {:?})",
            first_chars + second_chars,
            self.translator.name(),
            first_chars,
            second_chars,
            segments.strategy
        );

        let (first, second) = tokio::join!(
            self.translate_half(1, segments.first),
            self.translate_half(2, segments.second),
        );

        let outcome = match (first, second) {
            (Ok(first), Ok(second)) => usable(join_halves(&first, &second, segments.delimited)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        match outcome {
            Ok(merged) => {
                info!("Translation complete ({} chars)", merged.chars().count());
                self.emit(PipelineEvent::TranslationComplete {
                    text: Arc::from(merged.as_str()),
                });
                Ok(merged)
            }
            Err(e) => {
                warn!("Translation failed, nothing published: {}", e);
                self.emit(PipelineEvent::TranslationFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn translate_half(&self, index: usize, text: &str) -> Result<String> {
        // Blank halves (single-block input) are passed through untouched.
        if text.trim().is_empty() {
            debug!("Segment {} is blank, skipping translation call", index);
            return Ok(text.to_string());
        }

        let call = self.translator.translate_segment(&self.instructions, text);
        let translated = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.inspect_err(|e| warn!("Segment {} failed: {}", index, e))?,
            Err(_) => {
                warn!("Segment {} timed out after {:?}", index, self.call_timeout);
                return Err(CuelinkError::Timeout {
                    millis: self.call_timeout.as_millis() as u64,
                });
            }
        };

        if translated.trim().is_empty() {
            return Err(CuelinkError::Translation(format!(
                "Segment {} came back empty",
                index
            )));
        }

        debug!("Segment {} translated ({} chars)", index, translated.chars().count());
        Ok(translated)
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(bus) = &self.bus {
            bus.emit(event);
        }
    }
}

/// A merged reply without a single cue cannot be armed.
fn usable(merged: String) -> Result<String> {
    if parse(&merged).is_empty() {
        return Err(CuelinkError::Translation(
            "Translated text contains no cues".to_string(),
        ));
    }
    Ok(merged)
}
