//! HTTP surface for the policy classifier.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::set_header::SetResponseHeaderLayer;

use policycheck_classifier::Classifier;
use policycheck_common::PolicyCorpus;

pub mod rest;

pub struct AppState {
    pub classifier: Classifier,
    /// Current corpus snapshot. Readers clone the `Arc`; link updates swap it.
    pub corpus: RwLock<Arc<PolicyCorpus>>,
    pub corpus_path: PathBuf,
}

impl AppState {
    pub fn new(classifier: Classifier, corpus: PolicyCorpus, corpus_path: PathBuf) -> Self {
        Self {
            classifier,
            corpus: RwLock::new(Arc::new(corpus)),
            corpus_path,
        }
    }

    pub async fn corpus(&self) -> Arc<PolicyCorpus> {
        self.corpus.read().await.clone()
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Classification
        .route("/api/classify", post(rest::classify::api_classify))
        .route("/api/classify/batch", post(rest::classify::api_classify_batch))
        // Policy corpus
        .route("/api/policies", get(rest::policies::api_policies))
        .route("/api/policies/link", post(rest::policies::api_assign_link))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // No caching
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method + path only, never the request body
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
