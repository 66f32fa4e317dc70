use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use super::types::*;
use crate::error::AiError;
use crate::util::truncate_to_char_boundary;

pub(crate) const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest slice of an error body kept in an `AiError`.
const MAX_ERROR_BODY: usize = 512;

pub(crate) struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, timeout: Option<Duration>) -> Result<Self, AiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            http,
            base_url: GEMINI_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| AiError::Config("API key is not a valid header value".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!(model, "Gemini generateContent request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(response.json().await?)
    }
}

/// Build an `AiError::Api` from a non-2xx body. A Gemini error envelope
/// contributes its `message` and symbolic `status`; anything else is kept as
/// a bounded prefix of the raw body.
fn api_error(status: u16, body: &str) -> AiError {
    let raw = || truncate_to_char_boundary(body.trim(), MAX_ERROR_BODY).to_string();
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = if envelope.error.message.is_empty() {
                raw()
            } else {
                envelope.error.message
            };
            AiError::Api {
                status,
                kind: envelope.error.status.filter(|k| !k.is_empty()),
                message,
            }
        }
        Err(_) => AiError::Api {
            status,
            kind: None,
            message: raw(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(err: AiError) -> (u16, Option<String>, String) {
        match err {
            AiError::Api {
                status,
                kind,
                message,
            } => (status, kind, message),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn api_error_reads_envelope() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        let (status, kind, message) = parts(api_error(503, body));
        assert_eq!(status, 503);
        assert_eq!(kind.as_deref(), Some("UNAVAILABLE"));
        assert_eq!(message, "The model is overloaded.");
    }

    #[test]
    fn envelope_status_makes_500_retryable() {
        let body = r#"{"error": {"code": 500, "message": "Internal error", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert!(api_error(500, body).is_retryable());

        let body = r#"{"error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}}"#;
        assert!(!api_error(500, body).is_retryable());
    }

    #[test]
    fn api_error_keeps_raw_body() {
        let (_, kind, message) = parts(api_error(502, "  Bad Gateway \n"));
        assert_eq!(kind, None);
        assert_eq!(message, "Bad Gateway");
    }

    #[test]
    fn api_error_message_is_bounded() {
        let body = "é".repeat(1000);
        let (_, _, message) = parts(api_error(500, &body));
        assert!(message.len() <= MAX_ERROR_BODY);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = GeminiClient::new("k", None)
            .unwrap()
            .with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(client.base_url, "http://localhost:9999/v1beta");
    }
}
