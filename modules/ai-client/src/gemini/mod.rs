mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AiError;
use crate::traits::{CompletionBackend, CompletionRequest};

use client::GeminiClient;
use types::GenerateRequest;

// =============================================================================
// Gemini Backend
// =============================================================================

/// A Gemini `generateContent` backend bound to one API key.
///
/// The model is chosen per request, so one `Gemini` serves a whole rotation
/// list for its credential.
pub struct Gemini {
    name: String,
    api_key: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
    client: GeminiClient,
}

impl Gemini {
    pub fn new(name: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AiError::Config("Gemini API key is empty".into()));
        }
        let client = GeminiClient::new(&api_key, None)?;
        Ok(Self {
            name: name.into(),
            api_key,
            base_url: None,
            timeout: None,
            client,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.client = self.client.with_base_url(&url);
        self.base_url = Some(url);
        self
    }

    /// Per-request timeout enforced by the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, AiError> {
        let mut client = GeminiClient::new(&self.api_key, Some(timeout))?;
        if let Some(ref url) = self.base_url {
            client = client.with_base_url(url);
        }
        self.client = client;
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl CompletionBackend for Gemini {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let wire = GenerateRequest::new(&request.prompt)
            .system_instruction(&request.system_instruction)
            .temperature(request.temperature);

        let response = self.client.generate(&request.model, &wire).await?;

        let text = response
            .text()
            .ok_or_else(|| AiError::EmptyResponse(request.model.clone()))?;

        debug!(backend = %self.name, model = %request.model, chars = text.len(), "Gemini response received");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("primary", "test-key").unwrap();
        assert_eq!(ai.name(), "primary");
        assert_eq!(ai.api_key, "test-key");
        assert!(ai.timeout().is_none());
    }

    #[test]
    fn test_gemini_rejects_blank_key() {
        assert!(matches!(Gemini::new("primary", "  "), Err(AiError::Config(_))));
    }

    #[test]
    fn test_gemini_with_base_url_and_timeout() {
        let ai = Gemini::new("secondary", "k")
            .unwrap()
            .with_base_url("https://proxy.internal/v1beta")
            .with_timeout(Duration::from_secs(30))
            .unwrap();
        assert_eq!(ai.base_url.as_deref(), Some("https://proxy.internal/v1beta"));
        assert_eq!(ai.timeout(), Some(Duration::from_secs(30)));
    }
}
