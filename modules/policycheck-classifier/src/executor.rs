//! One provider's dispatch loop: rotate models, retry transient failures
//! with exponential backoff, give up after the attempt budget.

use std::sync::Arc;
use std::time::Duration;

use ai_client::{util::preview, AiError, CompletionBackend, CompletionRequest};
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::prompt::ClassificationPrompt;
use crate::retry::RetryPolicy;
use crate::rotation::ModelRotation;

pub struct ProviderExecutor {
    backend: Arc<dyn CompletionBackend>,
    rotation: ModelRotation,
    policy: RetryPolicy,
    timeout: Option<Duration>,
    temperature: Option<f32>,
}

impl ProviderExecutor {
    pub fn new(backend: Arc<dyn CompletionBackend>, rotation: ModelRotation, policy: RetryPolicy) -> Self {
        Self {
            backend,
            rotation,
            policy,
            timeout: None,
            temperature: None,
        }
    }

    /// Upper bound for a single backend call. Hitting it counts as a
    /// retryable timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn rotation(&self) -> &ModelRotation {
        &self.rotation
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the prompt until a model answers, a permanent error occurs, or
    /// the attempt budget is spent. Every attempt takes the next model in
    /// the rotation; a model that just failed may come round again.
    pub async fn execute(&self, prompt: &ClassificationPrompt) -> Result<String, ProviderError> {
        let provider = self.name();
        let mut attempt: u32 = 0;

        loop {
            let model = self.rotation.next();
            let mut request =
                CompletionRequest::new(model, &prompt.system_instruction, &prompt.prompt);
            if let Some(t) = self.temperature {
                request = request.temperature(t);
            }

            debug!(provider, model, attempt, "Dispatching classification request");

            let error = match self.dispatch(&request).await {
                Ok(text) => {
                    info!(provider, model, attempt, response = %preview(&text, 120), "Classification response received");
                    return Ok(text);
                }
                Err(e) => e,
            };

            if !error.is_retryable() {
                warn!(provider, model, attempt, status = ?error.status(), error = %error, "Non-retryable provider failure");
                return Err(ProviderError::Rejected {
                    provider: provider.to_string(),
                    model: model.to_string(),
                    source: error,
                });
            }

            if !self.policy.allows_retry_after(attempt) {
                warn!(provider, model, attempts = attempt + 1, error = %error, "Provider retries exhausted");
                return Err(ProviderError::Exhausted {
                    provider: provider.to_string(),
                    attempts: attempt + 1,
                    model: model.to_string(),
                    source: error,
                });
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                provider,
                model,
                attempt,
                status = ?error.status(),
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retryable provider failure, rotating model"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn dispatch(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let call = self.backend.complete(request);
        let text = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AiError::Timeout(format!("no response from {} within {limit:?}", request.model))
            })??,
            None => call.await?,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(AiError::EmptyResponse(request.model.clone()));
        }
        Ok(text.to_string())
    }
}
