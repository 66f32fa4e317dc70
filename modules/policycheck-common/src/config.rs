use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PRIMARY_MODELS: &str = "gemini-2.5-flash,gemini-2.0-flash,gemini-2.0-flash-lite";
pub const DEFAULT_SECONDARY_MODELS: &str = "gemini-1.5-flash,gemini-1.5-flash-8b";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI providers
    pub primary_api_key: String,
    pub secondary_api_key: String,
    pub gemini_base_url: String,
    pub primary_models: Vec<String>,
    pub secondary_models: Vec<String>,
    pub request_timeout: Duration,

    // Policy corpus
    pub corpus_path: PathBuf,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            primary_api_key: required_env("GEMINI_API_KEY"),
            secondary_api_key: required_env("GEMINI_FALLBACK_API_KEY"),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            primary_models: model_list(
                &env::var("PRIMARY_MODELS").unwrap_or_else(|_| DEFAULT_PRIMARY_MODELS.to_string()),
            ),
            secondary_models: model_list(
                &env::var("SECONDARY_MODELS")
                    .unwrap_or_else(|_| DEFAULT_SECONDARY_MODELS.to_string()),
            ),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("REQUEST_TIMEOUT_SECS must be a number"),
            ),
            corpus_path: env::var("POLICY_CORPUS_PATH")
                .unwrap_or_else(|_| "data/policies.json".to_string())
                .into(),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }

    /// Log the effective configuration with credentials masked.
    pub fn log_redacted(&self) {
        info!(
            primary_api_key = %redact(&self.primary_api_key),
            secondary_api_key = %redact(&self.secondary_api_key),
            gemini_base_url = %self.gemini_base_url,
            primary_models = ?self.primary_models,
            secondary_models = ?self.secondary_models,
            request_timeout_secs = self.request_timeout.as_secs(),
            corpus_path = %self.corpus_path.display(),
            web_host = %self.web_host,
            web_port = self.web_port,
            "Configuration loaded"
        );
    }
}

/// Split a comma-separated model list, dropping blanks.
pub fn model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_trims_and_drops_blanks() {
        assert_eq!(
            model_list(" gemini-2.0-flash , ,gemini-1.5-flash,"),
            vec!["gemini-2.0-flash".to_string(), "gemini-1.5-flash".to_string()]
        );
        assert!(model_list("").is_empty());
    }

    #[test]
    fn default_model_lists_are_disjoint() {
        let primary = model_list(DEFAULT_PRIMARY_MODELS);
        let secondary = model_list(DEFAULT_SECONDARY_MODELS);
        assert!(!primary.is_empty() && !secondary.is_empty());
        assert!(primary.iter().all(|m| !secondary.contains(m)));
    }

    #[test]
    fn redact_keeps_only_tail() {
        assert_eq!(redact("AIzaSyExampleKey1234"), "****1234");
        assert_eq!(redact("short"), "****");
    }
}
