use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuelinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Translation call timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No subtitle cues in {0}")]
    EmptySubtitle(String),

    #[error("Event handler error: {0}")]
    Handler(String),
}

impl CuelinkError {
    /// True for the failures that abort a translation cycle.
    pub fn is_translation_failure(&self) -> bool {
        matches!(self, Self::Translation(_) | Self::Timeout { .. } | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, CuelinkError>;
