use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Comment, Notification, Photo, User};
use crate::roles::Role;

// -- JWT Claims --

/// JWT claims shared between the REST middleware and token issuance.
/// Canonical definition lives here in snapshow-types to eliminate
/// duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

/// The requesting identity passed into every core operation: just enough
/// to drive capability and ownership checks.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Actor {
            id: claims.sub,
            role: claims.role,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub token: String,
}

// -- Photos --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitPhotoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// File reference returned by the upload endpoint.
    pub file_ref: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePhotoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Single photo plus everything the detail page needs: comments in
/// chronological order and permission flags computed for the requester.
#[derive(Debug, Serialize)]
pub struct PhotoDetailResponse {
    pub photo: Photo,
    pub comments: Vec<Comment>,
    pub can_vote: bool,
    pub can_comment: bool,
    pub can_edit: bool,
}

// -- Votes --

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub votes: i64,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostCommentRequest {
    pub content: String,
}

// -- Files --

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_ref: String,
    pub size: u64,
}

// -- Profile --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub photos: Vec<Photo>,
    pub unread_notifications: Vec<Notification>,
    pub approved_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}
