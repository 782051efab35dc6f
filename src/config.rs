use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{CuelinkError, Result};

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    1
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_playback_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub translate: TranslateConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Which translation backend to call
    pub provider: TranslationProvider,
    /// Base URL of the provider
    pub endpoint: String,
    /// Model name passed to the provider
    pub model: String,
    /// Environment variable holding the API key (chat-completions provider only)
    pub api_key_env: String,
    /// Target language code (e.g. "vi", "ja")
    pub target_language: String,
    /// Per-segment call timeout in seconds, shared by all provider attempts
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts a provider makes per segment before reporting failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Replaces the default role instructions when non-empty
    #[serde(default)]
    pub system_prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationProvider {
    /// Chat-completions API (api.openai.com or compatible)
    OpenAi,
    /// Local Ollama server
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Interval between simulated time updates
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Media seconds advanced per wall-clock second
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f64,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::OpenAi,
            endpoint: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            target_language: "vi".to_string(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            system_prompt: String::new(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            playback_rate: default_playback_rate(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CuelinkError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CuelinkError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CuelinkError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CuelinkError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CuelinkError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.timeout_secs == 0 {
            return Err(CuelinkError::Config("translate.timeout_secs must be positive".to_string()));
        }
        if self.translate.max_retries == 0 {
            return Err(CuelinkError::Config("translate.max_retries must be at least 1".to_string()));
        }
        if !(self.playback.playback_rate.is_finite() && self.playback.playback_rate > 0.0) {
            return Err(CuelinkError::Config(format!(
                "playback.playback_rate must be a positive number, got {}",
                self.playback.playback_rate
            )));
        }
        if self.playback.tick_interval_ms == 0 {
            return Err(CuelinkError::Config("playback.tick_interval_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuelink.toml");

        Config::default().save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();

        assert_eq!(loaded.translate.provider, TranslationProvider::OpenAi);
        assert_eq!(loaded.translate.model, "gpt-3.5-turbo");
        assert_eq!(loaded.translate.target_language, "vi");
        assert_eq!(loaded.playback.tick_interval_ms, 250);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let content = r#"
            [translate]
            provider = "Ollama"
            endpoint = "http://localhost:11434"
            model = "llama3.2:3b"
            api_key_env = ""
            target_language = "ja"
        "#;
        let config: Config = toml::from_str(content).unwrap();

        assert_eq!(config.translate.provider, TranslationProvider::Ollama);
        assert_eq!(config.translate.timeout_secs, 120);
        assert_eq!(config.translate.max_retries, 1);
        assert!(config.translate.system_prompt.is_empty());
        assert_eq!(config.playback.playback_rate, 1.0);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.translate.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(CuelinkError::Config(_))));
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let result = Config::from_file("/nonexistent/cuelink.toml");
        assert!(matches!(result, Err(CuelinkError::FileNotFound(_))));
    }
}
