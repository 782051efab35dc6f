use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::error::Result;

/// Delay between provider-level attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Floor for a single attempt when many retries share a short budget.
const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Role instructions sent with every segment.
pub fn build_instructions(config: &TranslateConfig) -> String {
    if !config.system_prompt.trim().is_empty() {
        return config.system_prompt.trim().to_string();
    }

    format!(
        "You are a translator. Translate this script to {}.",
        language_code_to_name(&config.target_language)
    )
}

/// User message wrapping the segment text.
pub fn build_user_message(target_language: &str, text: &str) -> String {
    format!(
        "Translate to {} and keep the timeline format exactly as given. \
         Do not merge, drop or renumber timestamp lines. Return only the translated script.\n\n{}",
        language_code_to_name(target_language),
        text
    )
}

/// Timeout for one HTTP attempt.
///
/// `timeout_secs` bounds the whole segment call, so the budget is shared by
/// `max_retries` attempts and the delays between them.
pub fn attempt_timeout(config: &TranslateConfig) -> Duration {
    let attempts = config.max_retries.max(1);
    let budget = Duration::from_secs(config.timeout_secs).saturating_sub(RETRY_DELAY * (attempts - 1));
    (budget / attempts).max(MIN_ATTEMPT_TIMEOUT)
}

/// HTTP client shared by the providers.
pub fn build_client(config: &TranslateConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(attempt_timeout(config))
        .build()?;
    Ok(client)
}

/// Runs `attempt` up to `max_attempts` times, returning the first success.
pub async fn with_retries<T, F, Fut>(max_attempts: u32, label: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if attempts < max_attempts => {
                warn!("{} attempt {}/{} failed: {}", label, attempts, max_attempts, e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => {
                debug!("{} giving up after {} attempts", label, attempts);
                return Err(e);
            }
        }
    }
}

/// English name for a language code, or the code itself when unknown.
pub fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "vi" => "Vietnamese".to_string(),
        "en" => "English".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "pl" => "Polish".to_string(),
        "nl" => "Dutch".to_string(),
        "tr" => "Turkish".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "th" => "Thai".to_string(),
        "id" => "Indonesian".to_string(),
        "sv" => "Swedish".to_string(),
        "uk" => "Ukrainian".to_string(),
        _ => code.to_string(),
    }
}
