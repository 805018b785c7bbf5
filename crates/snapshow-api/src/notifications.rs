use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use snapshow_types::api::{Actor, Claims};
use snapshow_types::models::Notification;

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

/// GET /notifications — unread only, newest first.
pub async fn list_unread(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_unread(&user_id))
        .await
        .map_err(join_error)??;

    let notifications: Vec<Notification> =
        rows.into_iter().map(|r| r.into_notification()).collect();
    Ok(Json(notifications))
}

/// POST /notifications/{id}/read — owner only, irreversible.
pub async fn mark_read(
    State(state): State<Arc<AppStateInner>>,
    Path(notification_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    tokio::task::spawn_blocking(move || db.db.mark_read(&actor, notification_id))
        .await
        .map_err(join_error)??;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let updated = tokio::task::spawn_blocking(move || db.db.mark_all_read(&user_id))
        .await
        .map_err(join_error)??;

    Ok(Json(serde_json::json!({ "updated": updated })))
}
