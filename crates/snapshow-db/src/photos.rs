use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use snapshow_types::api::Actor;
use snapshow_types::roles::{Capability, PhotoStatus};

use crate::Database;
use crate::comments::query_comments_for_photo;
use crate::error::ContestError;
use crate::models::{CommentRow, PhotoRow};
use crate::votes::vote_exists;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Everything the photo detail view needs, computed in one lock scope.
/// The permission flags re-apply the vote/comment/edit predicates for the
/// requesting identity without mutating anything.
#[derive(Debug)]
pub struct PhotoDetail {
    pub photo: PhotoRow,
    pub comments: Vec<CommentRow>,
    pub can_vote: bool,
    pub can_comment: bool,
    pub can_edit: bool,
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<PhotoRow> {
    Ok(PhotoRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        owner_username: row.get::<_, Option<String>>(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        filename: row.get(5)?,
        status: row.get(6)?,
        votes_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const PHOTO_JOIN: &str = "SELECT p.id, p.user_id, u.username, p.title, p.description, p.filename,
            p.status, p.votes_count, p.created_at
     FROM photos p
     LEFT JOIN users u ON p.user_id = u.id";

fn validate_title(title: &str) -> Result<&str, ContestError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ContestError::Validation("title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(ContestError::Validation("title is too long"));
    }
    Ok(title)
}

fn validate_description(description: Option<&str>) -> Result<Option<&str>, ContestError> {
    match description {
        Some(d) if d.len() > MAX_DESCRIPTION_LEN => {
            Err(ContestError::Validation("description is too long"))
        }
        other => Ok(other),
    }
}

impl Database {
    /// Submit a photo into the contest. It enters the moderation queue as
    /// `pending`; only participants hold the submit capability.
    pub fn submit_photo(
        &self,
        actor: &Actor,
        title: &str,
        description: Option<&str>,
        filename: &str,
    ) -> Result<PhotoRow, ContestError> {
        if !actor.role.has(Capability::SubmitPhoto) {
            return Err(ContestError::Forbidden("only participants can submit photos"));
        }
        let title = validate_title(title)?;
        let description = validate_description(description)?;
        if filename.trim().is_empty() {
            return Err(ContestError::Validation("a photo file is required"));
        }

        let photo_id = Uuid::new_v4().to_string();
        let photo = self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO photos (id, user_id, title, description, filename, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending')",
                (
                    &photo_id,
                    actor.id.to_string(),
                    title,
                    description,
                    filename,
                ),
            )?;
            query_photo(conn, &photo_id)?.ok_or(ContestError::NotFound("photo"))
        })?;

        self.notify_best_effort(
            &photo.user_id,
            &format!("Your photo \"{}\" has been submitted for review.", photo.title),
        );

        Ok(photo)
    }

    /// Edit title/description. Owners (or admins) may edit, and only while
    /// the photo is still pending review.
    pub fn update_photo(
        &self,
        actor: &Actor,
        photo_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<PhotoRow, ContestError> {
        let title = title.map(validate_title).transpose()?;
        let description = validate_description(description)?;

        self.with_conn_mut(|conn| {
            let photo = query_photo(conn, &photo_id.to_string())?
                .ok_or(ContestError::NotFound("photo"))?;

            if photo.user_id != actor.id.to_string() && !actor.role.is_admin() {
                return Err(ContestError::Forbidden("you can only edit your own photos"));
            }
            if photo.status() != PhotoStatus::Pending {
                return Err(ContestError::InvalidState("only pending photos can be edited"));
            }

            if let Some(title) = title {
                conn.execute(
                    "UPDATE photos SET title = ?1 WHERE id = ?2",
                    (title, &photo.id),
                )?;
            }
            if let Some(description) = description {
                conn.execute(
                    "UPDATE photos SET description = ?1 WHERE id = ?2",
                    (description, &photo.id),
                )?;
            }

            query_photo(conn, &photo.id)?.ok_or(ContestError::NotFound("photo"))
        })
    }

    /// Single-photo projection for the detail view. Visibility: approved
    /// photos are public; anything else is owner/admin only.
    pub fn photo_detail(
        &self,
        actor: Option<&Actor>,
        photo_id: Uuid,
    ) -> Result<PhotoDetail, ContestError> {
        self.with_conn(|conn| {
            let photo = query_photo(conn, &photo_id.to_string())?
                .ok_or(ContestError::NotFound("photo"))?;

            let status = photo.status();
            let is_owner =
                actor.is_some_and(|a| a.id.to_string() == photo.user_id);
            let is_admin = actor.is_some_and(|a| a.role.is_admin());

            if status != PhotoStatus::Approved && !is_owner && !is_admin {
                return Err(ContestError::Forbidden(
                    "this photo is not available for viewing",
                ));
            }

            let comments = query_comments_for_photo(conn, &photo.id)?;

            let can_vote = match actor {
                Some(a) => {
                    a.role.has(Capability::Vote)
                        && status == PhotoStatus::Approved
                        && !is_owner
                        && !vote_exists(conn, &a.id.to_string(), &photo.id)?
                }
                None => false,
            };
            let can_comment =
                actor.is_some() && (status == PhotoStatus::Approved || is_owner || is_admin);
            let can_edit = (is_owner || is_admin) && status == PhotoStatus::Pending;

            Ok(PhotoDetail {
                photo,
                comments,
                can_vote,
                can_comment,
                can_edit,
            })
        })
    }

    /// Public gallery: approved photos ranked by vote count. Ties break by
    /// submission order (created_at, then rowid), so repeated reads return
    /// the same sequence.
    pub fn list_gallery(&self, page: u32, per_page: u32) -> Result<Vec<PhotoRow>, ContestError> {
        let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
        let offset = (page.max(1) - 1) * per_page;

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PHOTO_JOIN}
                 WHERE p.status = 'approved'
                 ORDER BY p.votes_count DESC, p.created_at ASC, p.rowid ASC
                 LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt
                .query_map((per_page, offset), photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Top approved photos, same ordering as the gallery.
    pub fn leaderboard(&self, limit: u32) -> Result<Vec<PhotoRow>, ContestError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PHOTO_JOIN}
                 WHERE p.status = 'approved'
                 ORDER BY p.votes_count DESC, p.created_at ASC, p.rowid ASC
                 LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map([limit], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// The podium: top three approved photos.
    pub fn previous_winners(&self) -> Result<Vec<PhotoRow>, ContestError> {
        self.leaderboard(3)
    }

    /// A user's own submissions, newest first.
    pub fn photos_by_owner(&self, user_id: &str) -> Result<Vec<PhotoRow>, ContestError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PHOTO_JOIN}
                 WHERE p.user_id = ?1
                 ORDER BY p.created_at DESC, p.rowid DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Moderation queue listing, admin only.
    pub fn photos_by_status(
        &self,
        actor: &Actor,
        status: PhotoStatus,
    ) -> Result<Vec<PhotoRow>, ContestError> {
        if !actor.role.has(Capability::Moderate) {
            return Err(ContestError::Forbidden("admin access required"));
        }
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PHOTO_JOIN}
                 WHERE p.status = ?1
                 ORDER BY p.created_at ASC, p.rowid ASC"
            ))?;
            let rows = stmt
                .query_map([status.as_str()], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_photo(&self, photo_id: Uuid) -> Result<Option<PhotoRow>, ContestError> {
        self.with_conn(|conn| query_photo(conn, &photo_id.to_string()))
    }
}

pub(crate) fn query_photo(conn: &Connection, id: &str) -> Result<Option<PhotoRow>, ContestError> {
    let mut stmt = conn.prepare(&format!("{PHOTO_JOIN} WHERE p.id = ?1"))?;
    let row = stmt.query_row([id], photo_from_row).optional()?;
    Ok(row)
}
