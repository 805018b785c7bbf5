use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use snapshow_db::ContestError;
use snapshow_types::api::{Actor, Claims};
use snapshow_types::models::User;
use snapshow_types::roles::PhotoStatus;

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

pub async fn approve(
    state: State<Arc<AppStateInner>>,
    photo_id: Path<Uuid>,
    claims: Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    transition(state, photo_id, claims, PhotoStatus::Approved).await
}

pub async fn reject(
    state: State<Arc<AppStateInner>>,
    photo_id: Path<Uuid>,
    claims: Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    transition(state, photo_id, claims, PhotoStatus::Rejected).await
}

pub async fn revert(
    state: State<Arc<AppStateInner>>,
    photo_id: Path<Uuid>,
    claims: Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    transition(state, photo_id, claims, PhotoStatus::Pending).await
}

async fn transition(
    State(state): State<Arc<AppStateInner>>,
    Path(photo_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    status: PhotoStatus,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.set_photo_status(&actor, photo_id, status))
        .await
        .map_err(join_error)??;

    Ok(Json(row.into_photo()))
}

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    #[serde(default = "default_queue_status")]
    pub status: PhotoStatus,
}

fn default_queue_status() -> PhotoStatus {
    PhotoStatus::Pending
}

/// GET /admin/photos?status= — the review queues.
pub async fn list_photos(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<QueueQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.photos_by_status(&actor, query.status))
        .await
        .map_err(join_error)??;

    let photos: Vec<_> = rows.into_iter().map(|r| r.into_photo()).collect();
    Ok(Json(photos))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if !claims.role.is_admin() {
        return Err(ContestError::Forbidden("admin access required").into());
    }

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_users())
        .await
        .map_err(join_error)??;

    let users: Vec<User> = rows.into_iter().map(|r| r.into_user()).collect();
    Ok(Json(users))
}
