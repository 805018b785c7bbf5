use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::{PhotoStatus, Role};

/// Public user profile. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Display name of the owner, resolved by a join where the caller
    /// needs it; absent on owner-scoped listings.
    pub owner_username: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// Stored file reference under the uploads directory.
    pub filename: String,
    pub status: PhotoStatus,
    pub votes_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
