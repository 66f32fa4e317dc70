pub mod classify;
pub mod policies;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
