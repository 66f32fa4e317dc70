//! Classification entry points: single product, detailed analysis, batch.
//!
//! ```text
//! description ─► PromptBuilder ─► primary executor ──ok──► annotate ─► validate
//!                                      │ err                   ▲
//!                                      ▼                       │
//!                                secondary executor ───ok──────┘
//!                                      │ err
//!                                      ▼
//!                           AllProvidersExhausted
//! ```

use std::sync::Arc;
use std::time::Duration;

use ai_client::Gemini;
use anyhow::Context;
use policycheck_common::{Config, PolicyCorpus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ClassifyError;
use crate::executor::ProviderExecutor;
use crate::postprocess::annotate_detailed;
use crate::prompt::{ClassificationPrompt, PromptBuilder};
use crate::retry::RetryPolicy;
use crate::rotation::ModelRotation;
use crate::verdict::ClassificationResult;

/// Pause between consecutive batch items.
pub const BATCH_ITEM_DELAY: Duration = Duration::from_millis(300);

const TEMPERATURE: f32 = 0.1;

/// One row of a batch run. `index` is the item's position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub index: usize,
    pub product_description: String,
    pub analysis: String,
}

/// A validated classification and the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Sanitized model answer with the reference link appended.
    pub text: String,
    pub result: ClassificationResult,
    /// Which provider answered.
    pub provider: String,
}

pub struct Classifier {
    prompts: PromptBuilder,
    primary: ProviderExecutor,
    secondary: ProviderExecutor,
}

impl Classifier {
    pub fn new(primary: ProviderExecutor, secondary: ProviderExecutor) -> Self {
        Self {
            prompts: PromptBuilder::default(),
            primary,
            secondary,
        }
    }

    /// Two Gemini credentials, each with its own model rotation.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let primary = Gemini::new("primary", &config.primary_api_key)
            .context("primary Gemini backend")?
            .with_base_url(&config.gemini_base_url)
            .with_timeout(config.request_timeout)
            .context("primary Gemini backend")?;
        let secondary = Gemini::new("secondary", &config.secondary_api_key)
            .context("secondary Gemini backend")?
            .with_base_url(&config.gemini_base_url)
            .with_timeout(config.request_timeout)
            .context("secondary Gemini backend")?;

        let primary = ProviderExecutor::new(
            Arc::new(primary),
            ModelRotation::new(config.primary_models.iter().cloned())?,
            RetryPolicy::primary(),
        )
        .with_timeout(config.request_timeout)
        .with_temperature(TEMPERATURE);
        let secondary = ProviderExecutor::new(
            Arc::new(secondary),
            ModelRotation::new(config.secondary_models.iter().cloned())?,
            RetryPolicy::secondary(),
        )
        .with_timeout(config.request_timeout)
        .with_temperature(TEMPERATURE);

        Ok(Self::new(primary, secondary))
    }

    pub fn primary(&self) -> &ProviderExecutor {
        &self.primary
    }

    pub fn secondary(&self) -> &ProviderExecutor {
        &self.secondary
    }

    /// Classify one product and return the annotated answer text.
    pub async fn classify(
        &self,
        product_description: &str,
        corpus: &PolicyCorpus,
    ) -> Result<String, ClassifyError> {
        Ok(self.analyze(product_description, corpus).await?.text)
    }

    /// Classify one product and return both the annotated text and the
    /// parsed verdict.
    pub async fn analyze(
        &self,
        product_description: &str,
        corpus: &PolicyCorpus,
    ) -> Result<Analysis, ClassifyError> {
        if product_description.trim().is_empty() {
            return Err(ClassifyError::EmptyDescription);
        }

        let prompt = self.prompts.build(product_description, corpus);
        let (raw, provider) = self.complete(&prompt).await?;

        let annotation = annotate_detailed(&raw, corpus);
        let result = match ClassificationResult::parse(&annotation.body) {
            Ok(result) => result.with_reference_link(annotation.reference_link),
            Err(e) => {
                warn!(provider, error = %e, "Model answer failed verdict validation");
                return Err(e);
            }
        };

        info!(provider, verdict = %result.verdict, linked = result.reference_link.is_some(), "Product classified");

        Ok(Analysis {
            text: annotation.text,
            result,
            provider: provider.to_string(),
        })
    }

    /// Classify products one at a time, pausing between items. A failed item
    /// gets an in-band error analysis; the rest of the batch continues.
    pub async fn classify_batch(
        &self,
        product_descriptions: &[String],
        corpus: &PolicyCorpus,
    ) -> Vec<BatchItem> {
        let mut items = Vec::with_capacity(product_descriptions.len());

        for (index, description) in product_descriptions.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(BATCH_ITEM_DELAY).await;
            }

            let analysis = match self.classify(description, corpus).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(index, error = %e, "Batch item failed");
                    e.batch_analysis().to_string()
                }
            };

            items.push(BatchItem {
                index,
                product_description: description.clone(),
                analysis,
            });
        }

        info!(items = items.len(), "Batch classification complete");
        items
    }

    /// Primary first; any primary failure hands the same prompt to the
    /// secondary provider.
    async fn complete(&self, prompt: &ClassificationPrompt) -> Result<(String, &str), ClassifyError> {
        let primary_err = match self.primary.execute(prompt).await {
            Ok(text) => return Ok((text, self.primary.name())),
            Err(e) => e,
        };

        warn!(
            from = self.primary.name(),
            to = self.secondary.name(),
            error = %primary_err,
            "Primary provider failed, falling back"
        );

        match self.secondary.execute(prompt).await {
            Ok(text) => Ok((text, self.secondary.name())),
            Err(secondary_err) => Err(ClassifyError::AllProvidersExhausted {
                primary: primary_err,
                secondary: secondary_err,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_corpus, scripted_classifier, ScriptedBackend};
    use crate::verdict::Verdict;

    #[tokio::test(start_paused = true)]
    async fn analyze_returns_verdict_and_link() {
        let primary = Arc::new(
            ScriptedBackend::new("primary").reply("PROIBIDO: Segundo a política 3. ARMAS. Munição."),
        );
        let secondary = Arc::new(ScriptedBackend::new("secondary"));
        let classifier = scripted_classifier(primary, secondary.clone());

        let analysis = classifier.analyze("caixa de munição 9mm", &sample_corpus()).await.unwrap();

        assert_eq!(analysis.result.verdict, Verdict::Proibido);
        assert_eq!(analysis.result.explanation, "Segundo a política 3. ARMAS. Munição.");
        assert_eq!(
            analysis.result.reference_link.as_deref(),
            Some("https://help.shopee.com.br/x")
        );
        assert!(analysis.text.ends_with("\n\nhttps://help.shopee.com.br/x"));
        assert_eq!(analysis.provider, "primary");
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_carries_corpus_and_description() {
        let primary = Arc::new(ScriptedBackend::new("primary").reply("RESTRITO: exige ANVISA"));
        let classifier = scripted_classifier(primary.clone(), Arc::new(ScriptedBackend::new("secondary")));

        classifier.classify("Whey protein 1kg", &sample_corpus()).await.unwrap();

        let call = &primary.calls()[0];
        assert!(call.prompt.contains("5. SUPLEMENTOS\nSuplementos exigem"));
        assert!(call.prompt.ends_with("Whey protein 1kg"));
        assert!(call.system_instruction.contains("RESTRITO"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_description_never_reaches_a_provider() {
        let primary = Arc::new(ScriptedBackend::new("primary"));
        let classifier = scripted_classifier(primary.clone(), Arc::new(ScriptedBackend::new("secondary")));

        let err = classifier.classify("   ", &sample_corpus()).await.unwrap_err();

        assert!(matches!(err, ClassifyError::EmptyDescription));
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_answer_is_rejected_without_fallback() {
        let primary = Arc::new(ScriptedBackend::new("primary").reply("Acho que pode vender."));
        let secondary = Arc::new(ScriptedBackend::new("secondary").reply("PERMITIDO: ok"));
        let classifier = scripted_classifier(primary, secondary.clone());

        let err = classifier.classify("camiseta", &sample_corpus()).await.unwrap_err();

        assert!(matches!(err, ClassifyError::MalformedOutput(ref t) if t == "Acho que pode vender."));
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_waits_between_items_only() {
        let primary = Arc::new(ScriptedBackend::new("primary").always_reply("PERMITIDO: ok"));
        let classifier = scripted_classifier(primary, Arc::new(ScriptedBackend::new("secondary")));
        let start = tokio::time::Instant::now();

        let items = classifier
            .classify_batch(&["a".to_string(), "b".to_string(), "c".to_string()], &sample_corpus())
            .await;

        assert_eq!(items.len(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(650), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn batch_item_serializes_camel_case() {
        let item = BatchItem {
            index: 0,
            product_description: "faca".into(),
            analysis: "DEPENDE: tamanho".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productDescription"], "faca");
        assert_eq!(json["index"], 0);
    }
}
