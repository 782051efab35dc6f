// Chat-completions translation backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{CuelinkError, Result};
use super::{SegmentTranslator, common};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Text of the first choice; missing or blank content is a failure.
    pub fn into_content(self) -> Result<String> {
        let content = self
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CuelinkError::Translation("Response contained no choices".to_string()))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(CuelinkError::Translation("Empty translation received".to_string()));
        }
        Ok(content.to_string())
    }
}

pub struct OpenAiTranslator {
    client: Client,
    config: TranslateConfig,
    api_key: Option<String>,
}

impl OpenAiTranslator {
    /// Reads the API key from `config.api_key_env`; an empty variable name disables auth.
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let api_key = if config.api_key_env.trim().is_empty() {
            None
        } else {
            Some(std::env::var(&config.api_key_env).map_err(|_| {
                CuelinkError::Config(format!(
                    "Environment variable {} is not set",
                    config.api_key_env
                ))
            })?)
        };

        Ok(Self {
            client: common::build_client(&config)?,
            config,
            api_key,
        })
    }

    fn build_request(&self, instructions: &str, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: instructions.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: common::build_user_message(&self.config.target_language, text),
                },
            ],
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending chat completion request to: {}", url);

        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CuelinkError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CuelinkError::Translation(format!(
                "Chat completion API error {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| CuelinkError::Translation(format!("Failed to parse response: {}", e)))?;

        chat_response.into_content()
    }
}

#[async_trait]
impl SegmentTranslator for OpenAiTranslator {
    async fn translate_segment(&self, instructions: &str, text: &str) -> Result<String> {
        let request = self.build_request(instructions, text);
        common::with_retries(self.config.max_retries, "Chat completion", || self.complete(&request)).await
    }

    /// Looks the configured model up, which also checks the key.
    async fn check_availability(&self) -> Result<()> {
        let url = format!(
            "{}/v1/models/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );

        let mut builder = self.client.get(&url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CuelinkError::Translation(format!("Failed to connect to {}: {}", url, e)))?;

        if response.status().is_success() {
            info!("Model '{}' is available", self.config.model);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(CuelinkError::Translation(format!(
                "Model '{}' is not available ({}): {}",
                self.config.model, status, error_text
            )))
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
