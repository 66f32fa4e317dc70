use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use policycheck_classifier::{ClassificationResult, ClassifyError};

use super::error_response;
use crate::AppState;

/// Upper bound on descriptions per batch request.
pub const MAX_BATCH_ITEMS: usize = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    product_description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    product_descriptions: Vec<String>,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    analysis: String,
    #[serde(flatten)]
    result: ClassificationResult,
}

fn classify_error_status(err: &ClassifyError) -> StatusCode {
    match err {
        ClassifyError::EmptyDescription => StatusCode::BAD_REQUEST,
        ClassifyError::MalformedOutput(_) => StatusCode::BAD_GATEWAY,
        ClassifyError::AllProvidersExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub async fn api_classify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClassifyRequest>,
) -> Response {
    let corpus = state.corpus().await;

    match state.classifier.analyze(&body.product_description, &corpus).await {
        Ok(analysis) => Json(ClassifyResponse {
            analysis: analysis.text,
            result: analysis.result,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Classification request failed");
            error_response(classify_error_status(&e), e.user_message())
        }
    }
}

pub async fn api_classify_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest>,
) -> Response {
    let count = body.product_descriptions.len();
    if count == 0 {
        return error_response(StatusCode::BAD_REQUEST, "Informe ao menos uma descrição de produto.");
    }
    if count > MAX_BATCH_ITEMS {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("No máximo {MAX_BATCH_ITEMS} produtos por lote."),
        );
    }

    info!(items = count, "Batch classification requested");
    let corpus = state.corpus().await;
    let items = state
        .classifier
        .classify_batch(&body.product_descriptions, &corpus)
        .await;

    Json(items).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_is_bad_request() {
        assert_eq!(
            classify_error_status(&ClassifyError::EmptyDescription),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn malformed_output_is_bad_gateway() {
        let err = ClassifyError::MalformedOutput("talvez".into());
        assert_eq!(classify_error_status(&err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn response_flattens_result_fields() {
        let response = ClassifyResponse {
            analysis: "PROIBIDO: munição\n\nhttps://help.shopee.com.br/x".into(),
            result: ClassificationResult::parse("PROIBIDO: munição")
                .unwrap()
                .with_reference_link(Some("https://help.shopee.com.br/x".into())),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["verdict"], "PROIBIDO");
        assert_eq!(json["explanation"], "munição");
        assert_eq!(json["referenceLink"], "https://help.shopee.com.br/x");
        assert!(json["analysis"].as_str().unwrap().starts_with("PROIBIDO"));
    }
}
