// Local Ollama translation backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{CuelinkError, Result};
use super::{SegmentTranslator, common};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

pub struct OllamaTranslator {
    client: Client,
    config: TranslateConfig,
}

impl OllamaTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        Ok(Self {
            client: common::build_client(&config)?,
            config,
        })
    }

    fn build_prompt(&self, instructions: &str, text: &str) -> String {
        format!(
            "{}\n\n{}",
            instructions,
            common::build_user_message(&self.config.target_language, text)
        )
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| CuelinkError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CuelinkError::Translation(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CuelinkError::Translation(format!("Failed to parse response: {}", e)))?;

        let text = generated.response.trim();
        if text.is_empty() {
            return Err(CuelinkError::Translation("Empty translation received".to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl SegmentTranslator for OllamaTranslator {
    async fn translate_segment(&self, instructions: &str, text: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: self.build_prompt(instructions, text),
            stream: false,
        };
        common::with_retries(self.config.max_retries, "Ollama generate", || self.generate(&request)).await
    }

    /// Check the server is reachable and the model is pulled.
    async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.config.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": self.config.model }))
            .send()
            .await
            .map_err(|e| CuelinkError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(CuelinkError::Translation(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.config.model, self.config.model
            )))
        }
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationProvider;

    fn ollama_config() -> TranslateConfig {
        TranslateConfig {
            provider: TranslationProvider::Ollama,
            endpoint: "http://localhost:11434/".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key_env: String::new(),
            ..TranslateConfig::default()
        }
    }

    #[test]
    fn test_prompt_puts_instructions_before_segment() {
        let translator = OllamaTranslator::new(ollama_config()).unwrap();
        let prompt = translator.build_prompt("You are a translator.", "00:00.000 --> 00:01.000\nhello");

        assert!(prompt.starts_with("You are a translator.\n\nTranslate to Vietnamese"));
        assert!(prompt.ends_with("hello"));
    }

    #[test]
    fn test_generate_response_parses_without_done_flag() {
        let response: GenerateResponse = serde_json::from_str(r#"{"response":"xin chào"}"#).unwrap();
        assert_eq!(response.response, "xin chào");
        assert!(!response.done);
    }
}
