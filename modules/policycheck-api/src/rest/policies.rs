use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use policycheck_common::PolicyError;

use super::error_response;
use crate::AppState;

#[derive(Serialize)]
pub struct PolicySummary {
    name: String,
    link: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLinkRequest {
    category_name: String,
    link: String,
}

pub async fn api_policies(State(state): State<Arc<AppState>>) -> Json<Vec<PolicySummary>> {
    let corpus = state.corpus().await;
    Json(
        corpus
            .iter()
            .map(|c| PolicySummary {
                name: c.name.clone(),
                link: c.link.clone(),
            })
            .collect(),
    )
}

fn policy_error_status(err: &PolicyError) -> StatusCode {
    match err {
        PolicyError::Validation(_) => StatusCode::BAD_REQUEST,
        PolicyError::NotFound(_) => StatusCode::NOT_FOUND,
        PolicyError::LinkConflict { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn save_failed() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Não foi possível salvar as políticas.",
    )
}

/// Bind a help-centre link to a category and persist the corpus.
///
/// The write lock is held across validation, save and swap so concurrent
/// updates serialize; readers keep the previous snapshot until the swap.
/// The file write runs on the blocking pool.
pub async fn api_assign_link(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssignLinkRequest>,
) -> Response {
    if body.category_name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Informe o nome da categoria.");
    }

    let mut current = state.corpus.write().await;
    let mut next = (**current).clone();

    let changed = match next.assign_link(&body.category_name, &body.link) {
        Ok(changed) => changed,
        Err(e) => {
            warn!(error = %e, "Rejected policy link update");
            return error_response(policy_error_status(&e), e.to_string());
        }
    };

    if !changed {
        return Json(serde_json::json!({ "status": "unchanged" })).into_response();
    }

    let path = state.corpus_path.clone();
    let saved = tokio::task::spawn_blocking(move || next.save(&path).map(|()| next)).await;
    let next = match saved {
        Ok(Ok(next)) => next,
        Ok(Err(e)) => {
            warn!(error = %e, path = %state.corpus_path.display(), "Failed to persist policy corpus");
            return save_failed();
        }
        Err(e) => {
            warn!(error = %e, "Corpus save task failed");
            return save_failed();
        }
    };

    *current = Arc::new(next);
    info!(category = body.category_name.trim(), "Policy link updated");

    Json(serde_json::json!({ "status": "updated" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_map_to_statuses() {
        assert_eq!(
            policy_error_status(&PolicyError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            policy_error_status(&PolicyError::NotFound("9. NADA".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            policy_error_status(&PolicyError::LinkConflict {
                link: "https://help.shopee.com.br/x".into(),
                category: "3. ARMAS".into(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            policy_error_status(&PolicyError::Corpus("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
