// Test doubles for the classification pipeline.
//
// ScriptedBackend replays a queue of outcomes in order and records every
// request it receives, so tests can assert which models were tried, how
// often, and with what prompt. No network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_client::{AiError, CompletionBackend, CompletionRequest};
use async_trait::async_trait;
use policycheck_common::{PolicyCategory, PolicyCorpus};

use crate::classifier::Classifier;
use crate::executor::ProviderExecutor;
use crate::retry::RetryPolicy;
use crate::rotation::ModelRotation;

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Status(u16),
    Api {
        status: u16,
        kind: Option<String>,
        message: String,
    },
    Error(String),
}

#[derive(Debug, Clone)]
struct Step {
    delay: Option<Duration>,
    outcome: Outcome,
}

/// Backend that replays scripted outcomes. When the script runs out it
/// repeats the `always_*` outcome if one was set, otherwise it fails with a
/// non-retryable config error.
pub struct ScriptedBackend {
    name: String,
    script: Mutex<VecDeque<Step>>,
    fallback: Option<Outcome>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn push(self, delay: Option<Duration>, outcome: Outcome) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Step { delay, outcome });
        self
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(None, Outcome::Reply(text.to_string()))
    }

    pub fn fail_status(self, status: u16) -> Self {
        self.push(None, Outcome::Status(status))
    }

    /// API failure with a provider status kind and message, as parsed from
    /// an error envelope.
    pub fn fail_api(self, status: u16, kind: Option<&str>, message: &str) -> Self {
        self.push(
            None,
            Outcome::Api {
                status,
                kind: kind.map(str::to_string),
                message: message.to_string(),
            },
        )
    }

    /// Transport-level failure (retryable).
    pub fn fail_network(self, message: &str) -> Self {
        self.push(None, Outcome::Error(message.to_string()))
    }

    /// Answer only after `delay`; pair with an executor timeout.
    pub fn stall(self, delay: Duration) -> Self {
        self.push(Some(delay), Outcome::Reply("PERMITIDO: resposta atrasada".to_string()))
    }

    pub fn always_status(mut self, status: u16) -> Self {
        self.fallback = Some(Outcome::Status(status));
        self
    }

    pub fn always_reply(mut self, text: &str) -> Self {
        self.fallback = Some(Outcome::Reply(text.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn models(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        self.calls.lock().expect("calls lock").push(request.clone());

        let step = self.script.lock().expect("script lock").pop_front();
        let step = match (step, &self.fallback) {
            (Some(step), _) => step,
            (None, Some(outcome)) => Step {
                delay: None,
                outcome: outcome.clone(),
            },
            (None, None) => {
                return Err(AiError::Config(format!(
                    "ScriptedBackend {}: script exhausted",
                    self.name
                )))
            }
        };

        if let Some(delay) = step.delay {
            tokio::time::sleep(delay).await;
        }

        match step.outcome {
            Outcome::Reply(text) => Ok(text),
            Outcome::Status(status) => Err(AiError::Api {
                status,
                kind: None,
                message: format!("scripted HTTP {status}"),
            }),
            Outcome::Api {
                status,
                kind,
                message,
            } => Err(AiError::Api {
                status,
                kind,
                message,
            }),
            Outcome::Error(message) => Err(AiError::Network(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub const PRIMARY_MODELS: [&str; 3] = ["primary-a", "primary-b", "primary-c"];
pub const SECONDARY_MODELS: [&str; 2] = ["secondary-a", "secondary-b"];

/// Classifier wired to two scripted backends with the production retry
/// policies and model lists from [`PRIMARY_MODELS`] / [`SECONDARY_MODELS`].
pub fn scripted_classifier(
    primary: Arc<ScriptedBackend>,
    secondary: Arc<ScriptedBackend>,
) -> Classifier {
    let primary = ProviderExecutor::new(
        primary,
        ModelRotation::new(PRIMARY_MODELS).expect("primary models"),
        RetryPolicy::primary(),
    );
    let secondary = ProviderExecutor::new(
        secondary,
        ModelRotation::new(SECONDARY_MODELS).expect("secondary models"),
        RetryPolicy::secondary(),
    );
    Classifier::new(primary, secondary)
}

/// Small corpus with one linked and one unlinked category.
pub fn sample_corpus() -> PolicyCorpus {
    PolicyCorpus::new(vec![
        PolicyCategory::new(
            "3. ARMAS",
            "https://help.shopee.com.br/x",
            "Armas de fogo e munições são proibidas.",
        ),
        PolicyCategory::new(
            "5. SUPLEMENTOS",
            "",
            "Suplementos exigem autorização e documentação da ANVISA.",
        ),
    ])
}
