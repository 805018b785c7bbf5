//! Database row types — these map directly to SQLite rows.
//! Distinct from the snapshow-types API models to keep the DB layer
//! independent; conversions live here because every handler needs them.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use snapshow_types::models::{Comment, Notification, Photo, User};
use snapshow_types::roles::{PhotoStatus, Role};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

#[derive(Debug)]
pub struct PhotoRow {
    pub id: String,
    pub user_id: String,
    /// Resolved via JOIN on listing queries; `None` where the query
    /// doesn't need it.
    pub owner_username: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub status: String,
    pub votes_count: i64,
    pub created_at: String,
}

#[derive(Debug)]
pub struct CommentRow {
    pub id: String,
    pub photo_id: String,
    pub user_id: String,
    pub author_username: String,
    pub content: String,
    pub status: String,
    pub created_at: String,
}

pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

/// Parse a stored UUID, falling back to nil on corruption rather than
/// failing the whole read.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Accept RFC 3339 too, parse as naive UTC otherwise.
pub(crate) fn parse_timestamp(raw: &str, what: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} timestamp '{}': {}", what, raw, e);
            DateTime::default()
        })
}

impl UserRow {
    pub fn into_user(self) -> User {
        let role = self.role.parse::<Role>().unwrap_or_else(|e| {
            warn!("{} on user '{}', defaulting to participant", e, self.id);
            Role::Participant
        });
        User {
            id: parse_uuid(&self.id, "user id"),
            username: self.username,
            email: self.email,
            role,
            bio: self.bio,
            profile_picture: self.profile_picture,
            created_at: parse_timestamp(&self.created_at, "user"),
        }
    }
}

impl PhotoRow {
    pub fn status(&self) -> PhotoStatus {
        self.status.parse().unwrap_or_else(|e| {
            warn!("{} on photo '{}', treating as pending", e, self.id);
            PhotoStatus::Pending
        })
    }

    pub fn into_photo(self) -> Photo {
        let status = self.status();
        Photo {
            id: parse_uuid(&self.id, "photo id"),
            owner_id: parse_uuid(&self.user_id, "photo owner id"),
            owner_username: self.owner_username,
            title: self.title,
            description: self.description,
            filename: self.filename,
            status,
            votes_count: self.votes_count,
            created_at: parse_timestamp(&self.created_at, "photo"),
        }
    }
}

impl CommentRow {
    pub fn into_comment(self) -> Comment {
        Comment {
            id: parse_uuid(&self.id, "comment id"),
            photo_id: parse_uuid(&self.photo_id, "comment photo id"),
            author_id: parse_uuid(&self.user_id, "comment author id"),
            author_username: self.author_username,
            content: self.content,
            created_at: parse_timestamp(&self.created_at, "comment"),
        }
    }
}

impl NotificationRow {
    pub fn into_notification(self) -> Notification {
        Notification {
            id: parse_uuid(&self.id, "notification id"),
            message: self.message,
            is_read: self.is_read,
            created_at: parse_timestamp(&self.created_at, "notification"),
        }
    }
}
