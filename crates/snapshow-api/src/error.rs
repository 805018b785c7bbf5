use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use snapshow_db::ContestError;

/// HTTP-facing wrapper over the core's typed errors so handlers can use
/// `?` straight onto database operations.
pub enum ApiError {
    Contest(ContestError),
    /// Bad credentials at login; not a core error kind.
    Unauthorized,
}

impl From<ContestError> for ApiError {
    fn from(e: ContestError) -> Self {
        ApiError::Contest(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid email or password".to_string())
            }
            ApiError::Contest(e) => match &e {
                ContestError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                ContestError::Forbidden(_) => (StatusCode::FORBIDDEN, e.to_string()),
                ContestError::InvalidState(_)
                | ContestError::InvalidOperation(_)
                | ContestError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                ContestError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()),
                ContestError::Internal(inner) => {
                    error!("Internal error: {:#}", inner);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Blocking DB work runs under spawn_blocking; a join failure is an
/// internal fault, not a domain outcome.
pub(crate) fn join_error(e: tokio::task::JoinError) -> ContestError {
    ContestError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e))
}
