use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use snapshow_types::api::{
    Actor, Claims, PhotoDetailResponse, SubmitPhotoRequest, UpdatePhotoRequest,
};
use snapshow_types::models::Photo;

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    12
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    pub limit: u32,
}

fn default_leaderboard_limit() -> u32 {
    20
}

pub async fn submit_photo(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitPhotoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .submit_photo(&actor, &req.title, req.description.as_deref(), &req.file_ref)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(row.into_photo())))
}

pub async fn update_photo(
    State(state): State<Arc<AppStateInner>>,
    Path(photo_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePhotoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.update_photo(
            &actor,
            photo_id,
            req.title.as_deref(),
            req.description.as_deref(),
        )
    })
    .await
    .map_err(join_error)??;

    Ok(Json(row.into_photo()))
}

/// GET /photos/{id} — public for approved photos; claims, when present,
/// unlock owner/admin visibility and drive the permission flags.
pub async fn photo_detail(
    State(state): State<Arc<AppStateInner>>,
    Path(photo_id): Path<Uuid>,
    Extension(claims): Extension<Option<Claims>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.as_ref().map(Actor::from);

    let db = state.clone();
    let detail =
        tokio::task::spawn_blocking(move || db.db.photo_detail(actor.as_ref(), photo_id))
            .await
            .map_err(join_error)??;

    Ok(Json(PhotoDetailResponse {
        photo: detail.photo.into_photo(),
        comments: detail
            .comments
            .into_iter()
            .map(|c| c.into_comment())
            .collect(),
        can_vote: detail.can_vote,
        can_comment: detail.can_comment,
        can_edit: detail.can_edit,
    }))
}

pub async fn gallery(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<GalleryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows =
        tokio::task::spawn_blocking(move || db.db.list_gallery(query.page, query.per_page))
            .await
            .map_err(join_error)??;

    Ok(Json(into_photos(rows)))
}

pub async fn leaderboard(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.min(100);

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.leaderboard(limit))
        .await
        .map_err(join_error)??;

    Ok(Json(into_photos(rows)))
}

pub async fn previous_winners(
    State(state): State<Arc<AppStateInner>>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.previous_winners())
        .await
        .map_err(join_error)??;

    Ok(Json(into_photos(rows)))
}

fn into_photos(rows: Vec<snapshow_db::models::PhotoRow>) -> Vec<Photo> {
    rows.into_iter().map(|r| r.into_photo()).collect()
}
