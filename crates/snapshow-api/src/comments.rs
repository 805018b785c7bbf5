use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use snapshow_types::api::{Actor, Claims, PostCommentRequest};

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

/// POST /photos/{id}/comments — returns the persisted comment with the
/// author's display name resolved.
pub async fn post_comment(
    State(state): State<Arc<AppStateInner>>,
    Path(photo_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PostCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.post_comment(&actor, photo_id, &req.content))
        .await
        .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(row.into_comment())))
}
