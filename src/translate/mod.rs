// Translation collaborators and the two-segment coordinator
//
// - common: prompts, HTTP client, provider-level retries
// - openai: chat-completions backend
// - ollama: local Ollama backend
// - coordinator: segment, translate both halves concurrently, merge in order

pub mod common;
pub mod coordinator;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub use coordinator::TranslationCoordinator;
use crate::config::{TranslateConfig, TranslationProvider};
use crate::error::Result;

/// External text-translation call: role instructions plus segment text in,
/// translated text out. Any non-success, including malformed payloads, is an error.
#[async_trait]
pub trait SegmentTranslator: Send + Sync {
    async fn translate_segment(&self, instructions: &str, text: &str) -> Result<String>;

    /// Probe the backend before a run. Backends without a probe report ready.
    async fn check_availability(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator for the configured provider
    pub fn create_translator(config: TranslateConfig) -> Result<Arc<dyn SegmentTranslator>> {
        info!("Using {:?} translation provider with model {}", config.provider, config.model);
        let translator: Arc<dyn SegmentTranslator> = match config.provider {
            TranslationProvider::OpenAi => Arc::new(openai::OpenAiTranslator::new(config)?),
            TranslationProvider::Ollama => Arc::new(ollama::OllamaTranslator::new(config)?),
        };
        Ok(translator)
    }
}
