use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use snapshow_db::ContestError;
use snapshow_types::api::{Claims, UploadResponse};

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

/// 16 MB upload limit, enforced again by the router's body limit.
pub const MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Client-side filename; only its extension is used.
    pub filename: String,
}

/// POST /files — accepts raw image bytes (application/octet-stream),
/// stores them under a fresh name, returns the file reference to pass to
/// photo submission.
pub async fn upload_file(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<UploadQuery>,
    Extension(_claims): Extension<Claims>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let file_ref = save_upload(&state, &query.filename, &bytes).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_ref,
            size: bytes.len() as u64,
        }),
    ))
}

/// POST /users/me/avatar — same store, but the file becomes the caller's
/// profile picture.
pub async fn upload_avatar(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<UploadQuery>,
    Extension(claims): Extension<Claims>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let file_ref = save_upload(&state, &query.filename, &bytes).await?;

    let db = state.clone();
    let user_id = claims.sub.to_string();
    let stored = file_ref.clone();
    tokio::task::spawn_blocking(move || db.db.set_profile_picture(&user_id, &stored))
        .await
        .map_err(join_error)??;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_ref,
            size: bytes.len() as u64,
        }),
    ))
}

async fn save_upload(
    state: &AppStateInner,
    filename: &str,
    bytes: &[u8],
) -> Result<String, ApiError> {
    if bytes.is_empty() {
        return Err(ContestError::Validation("no file data received").into());
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(ContestError::Validation("file exceeds the 16 MB limit").into());
    }

    Ok(state.storage.save(filename, bytes).await?)
}
