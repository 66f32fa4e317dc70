//! Product-listing policy classification over redundant LLM providers.
//!
//! A description is turned into a prompt embedding the whole policy corpus,
//! sent through the primary provider's model rotation (with retries), then
//! through the secondary provider if the primary fails. The answer is
//! sanitized, annotated with the cited policy's reference link and validated
//! against the four verdicts.

pub mod classifier;
pub mod error;
pub mod executor;
pub mod postprocess;
pub mod prompt;
pub mod retry;
pub mod rotation;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod verdict;

pub use classifier::{Analysis, BatchItem, Classifier, BATCH_ITEM_DELAY};
pub use error::{ClassifyError, ProviderError, PROVIDERS_UNAVAILABLE_MESSAGE};
pub use executor::ProviderExecutor;
pub use postprocess::{annotate, annotate_detailed, Annotation};
pub use prompt::{ClassificationPrompt, PromptBuilder};
pub use retry::RetryPolicy;
pub use rotation::ModelRotation;
pub use verdict::{ClassificationResult, Verdict};
