use ai_client::AiError;
use thiserror::Error;

/// Shown to end users when neither provider could answer.
pub const PROVIDERS_UNAVAILABLE_MESSAGE: &str =
    "Os dois provedores de IA estão indisponíveis no momento. Tente novamente em alguns minutos.";

/// Shown to end users when the model answered outside the verdict format.
pub const MALFORMED_OUTPUT_MESSAGE: &str =
    "A IA retornou uma resposta fora do formato esperado. Tente reformular a descrição do produto.";

pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Informe a descrição do produto.";

/// In-band batch analysis for an item whose providers were all exhausted.
pub const BATCH_PROVIDERS_UNAVAILABLE: &str =
    "ERRO: os dois provedores de IA estão indisponíveis para este item.";

/// In-band batch analysis for an item with an unparseable model answer.
pub const BATCH_MALFORMED_OUTPUT: &str = "ERRO: resposta da IA fora do formato esperado.";

pub const BATCH_EMPTY_DESCRIPTION: &str = "ERRO: descrição do produto vazia.";

/// Failure of one provider's rotation+retry loop.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: retries exhausted after {attempts} attempts, last model {model}: {source}")]
    Exhausted {
        provider: String,
        attempts: u32,
        model: String,
        #[source]
        source: AiError,
    },

    #[error("{provider}: non-retryable failure on model {model}: {source}")]
    Rejected {
        provider: String,
        model: String,
        #[source]
        source: AiError,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Exhausted { provider, .. } | ProviderError::Rejected { provider, .. } => {
                provider
            }
        }
    }

    pub fn last_error(&self) -> &AiError {
        match self {
            ProviderError::Exhausted { source, .. } | ProviderError::Rejected { source, .. } => {
                source
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("all providers exhausted (primary: {primary}; secondary: {secondary})")]
    AllProvidersExhausted {
        primary: ProviderError,
        secondary: ProviderError,
    },

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("product description is empty")]
    EmptyDescription,
}

impl ClassifyError {
    /// User-facing text. Never includes backend error details.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClassifyError::AllProvidersExhausted { .. } => PROVIDERS_UNAVAILABLE_MESSAGE,
            ClassifyError::MalformedOutput(_) => MALFORMED_OUTPUT_MESSAGE,
            ClassifyError::EmptyDescription => EMPTY_DESCRIPTION_MESSAGE,
        }
    }

    /// Analysis text recorded in place of a failed batch item.
    pub fn batch_analysis(&self) -> &'static str {
        match self {
            ClassifyError::AllProvidersExhausted { .. } => BATCH_PROVIDERS_UNAVAILABLE,
            ClassifyError::MalformedOutput(_) => BATCH_MALFORMED_OUTPUT,
            ClassifyError::EmptyDescription => BATCH_EMPTY_DESCRIPTION,
        }
    }
}
