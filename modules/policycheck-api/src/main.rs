use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use policycheck_api::{app, AppState};
use policycheck_classifier::Classifier;
use policycheck_common::{Config, PolicyCorpus};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("policycheck=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let corpus = PolicyCorpus::load(&config.corpus_path)?;
    let classifier = Classifier::from_config(&config)?;

    let state = Arc::new(AppState::new(classifier, corpus, config.corpus_path.clone()));

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Policy classifier API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
