use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};

use snapshow_db::ContestError;
use snapshow_types::api::{Claims, ProfileResponse, UpdateProfileRequest};
use snapshow_types::roles::PhotoStatus;

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

/// GET /users/me — the signed-in user's profile: their submissions
/// (newest first), unread notifications, and review-status counts.
pub async fn profile(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();

    let (user, photos, unread) = tokio::task::spawn_blocking(move || {
        let user = db
            .db
            .get_user_by_id(&user_id)?
            .ok_or(ContestError::NotFound("user"))?;
        let photos = db.db.photos_by_owner(&user_id)?;
        let unread = db.db.list_unread(&user_id)?;
        Ok::<_, ContestError>((user, photos, unread))
    })
    .await
    .map_err(join_error)??;

    let photos: Vec<_> = photos.into_iter().map(|r| r.into_photo()).collect();
    let approved_count = photos
        .iter()
        .filter(|p| p.status == PhotoStatus::Approved)
        .count();
    let pending_count = photos
        .iter()
        .filter(|p| p.status == PhotoStatus::Pending)
        .count();

    Ok(Json(ProfileResponse {
        user: user.into_user(),
        photos,
        unread_notifications: unread.into_iter().map(|r| r.into_notification()).collect(),
        approved_count,
        pending_count,
    }))
}

/// PATCH /users/me — display name and/or bio.
pub async fn update_profile(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = match req.username.as_deref().map(str::trim) {
        Some(name) if name.len() < 3 || name.len() > 80 => {
            return Err(ContestError::Validation("username must be 3-80 characters").into());
        }
        other => other.map(str::to_string),
    };
    if req.bio.as_deref().is_some_and(|b| b.len() > 1000) {
        return Err(ContestError::Validation("bio is too long").into());
    }

    let db = state.clone();
    let user_id = claims.sub.to_string();
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .update_profile(&user_id, username.as_deref(), req.bio.as_deref())
    })
    .await
    .map_err(join_error)??;

    Ok(Json(row.into_user()))
}
