use async_trait::async_trait;

use crate::error::AiError;

// =============================================================================
// Request Types
// =============================================================================

/// One single-turn completion: a system instruction plus a user prompt,
/// addressed to a specific model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        system_instruction: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// =============================================================================
// CompletionBackend Trait
// =============================================================================

/// A credential-bound connection to a generative completion service.
///
/// Implementations return the trimmed response text, or an [`AiError`] whose
/// [`AiError::is_retryable`] decides whether the caller may try again.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short label used in logs ("primary", "secondary", ...).
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError>;
}
