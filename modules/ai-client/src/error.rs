use thiserror::Error;

/// Provider status codes that mean "try again later".
const RETRYABLE_KINDS: &[&str] = &["UNAVAILABLE", "RESOURCE_EXHAUSTED"];

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// `kind` is the provider's symbolic status (`UNAVAILABLE`,
    /// `RESOURCE_EXHAUSTED`, ...) when the error body carried one.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from model {0}")]
    EmptyResponse(String),
}

impl AiError {
    /// Transient failures worth retrying on another model: rate limits and
    /// overloaded or unavailable backends (by HTTP status, provider status or
    /// an "overloaded" message), network faults and timeouts.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::Network(_) | AiError::Timeout(_) => true,
            AiError::Api {
                status,
                kind,
                message,
            } => {
                matches!(status, 429 | 503)
                    || matches!(kind.as_deref(), Some(k) if RETRYABLE_KINDS.contains(&k))
                    || message.to_lowercase().contains("overloaded")
            }
            AiError::Config(_) | AiError::Parse(_) | AiError::EmptyResponse(_) => false,
        }
    }

    /// HTTP status of the failed call, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout(e.to_string())
        } else if e.is_decode() {
            AiError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            AiError::Api {
                status: status.as_u16(),
                kind: None,
                message: e.to_string(),
            }
        } else {
            AiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> AiError {
        AiError::Api {
            status,
            kind: None,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn rate_limit_and_unavailable_are_retryable() {
        assert!(api(429).is_retryable());
        assert!(api(503).is_retryable());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!api(400).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(!api(500).is_retryable());
    }

    #[test]
    fn overloaded_message_is_retryable_whatever_the_status() {
        let err = AiError::Api {
            status: 500,
            kind: None,
            message: "The model is overloaded. Please try again later.".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn provider_status_kinds_are_retryable() {
        for kind in ["UNAVAILABLE", "RESOURCE_EXHAUSTED"] {
            let err = AiError::Api {
                status: 500,
                kind: Some(kind.into()),
                message: "internal".into(),
            };
            assert!(err.is_retryable(), "{kind}");
        }

        let err = AiError::Api {
            status: 400,
            kind: Some("INVALID_ARGUMENT".into()),
            message: "bad request".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_failures_are_retryable() {
        assert!(AiError::Network("connection reset".into()).is_retryable());
        assert!(AiError::Timeout("30s".into()).is_retryable());
    }

    #[test]
    fn parse_and_empty_are_permanent() {
        assert!(!AiError::Parse("eof".into()).is_retryable());
        assert!(!AiError::EmptyResponse("gemini-2.0-flash".into()).is_retryable());
        assert!(!AiError::Config("missing key".into()).is_retryable());
    }

    #[test]
    fn status_only_for_api_errors() {
        assert_eq!(api(503).status(), Some(503));
        assert_eq!(AiError::Network("x".into()).status(), None);
    }
}
