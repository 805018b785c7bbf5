use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use snapshow_types::api::{Actor, Claims, VoteResponse};

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

/// POST /photos/{id}/vote — the vote ledger does all the checking; this
/// handler only shuttles the result.
pub async fn cast_vote(
    State(state): State<Arc<AppStateInner>>,
    Path(photo_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = Actor::from(&claims);

    let db = state.clone();
    let votes = tokio::task::spawn_blocking(move || db.db.cast_vote(&actor, photo_id))
        .await
        .map_err(join_error)??;

    Ok(Json(VoteResponse { votes }))
}
