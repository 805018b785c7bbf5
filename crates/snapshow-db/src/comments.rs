use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use snapshow_types::api::Actor;
use snapshow_types::roles::{CommentStatus, PhotoStatus};

use crate::Database;
use crate::error::ContestError;
use crate::models::CommentRow;

pub const MAX_COMMENT_LEN: usize = 500;

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        photo_id: row.get(1)?,
        user_id: row.get(2)?,
        author_username: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| "unknown".to_string()),
        content: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Append a comment. Approved photos accept comments from anyone
    /// signed in; pending/rejected photos only from their owner or an
    /// admin. Comments are immutable once posted.
    pub fn post_comment(
        &self,
        actor: &Actor,
        photo_id: Uuid,
        content: &str,
    ) -> Result<CommentRow, ContestError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ContestError::Validation("comment cannot be empty"));
        }
        if content.len() > MAX_COMMENT_LEN {
            return Err(ContestError::Validation("comment is too long"));
        }

        let comment_id = Uuid::new_v4().to_string();
        let author_id = actor.id.to_string();

        let (comment, owner_id, title) = self.with_conn_mut(|conn| {
            let (owner_id, title, status): (String, String, String) = conn
                .query_row(
                    "SELECT user_id, title, status FROM photos WHERE id = ?1",
                    [photo_id.to_string()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?
                .ok_or(ContestError::NotFound("photo"))?;

            let approved = status.parse::<PhotoStatus>().ok() == Some(PhotoStatus::Approved);
            if !approved && owner_id != author_id && !actor.role.is_admin() {
                return Err(ContestError::Forbidden("you cannot comment on this photo"));
            }

            conn.execute(
                "INSERT INTO comments (id, user_id, photo_id, content, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    &comment_id,
                    &author_id,
                    photo_id.to_string(),
                    content,
                    CommentStatus::Active.as_str(),
                ),
            )?;

            let comment = query_comment(conn, &comment_id)?
                .ok_or(ContestError::NotFound("comment"))?;
            Ok((comment, owner_id, title))
        })?;

        self.notify_best_effort(
            &owner_id,
            &format!("Your photo \"{}\" has a new comment.", title),
        );

        Ok(comment)
    }

    /// Comments on a photo in posting order. `removed` comments stay out
    /// of every listing; `flagged` ones remain visible.
    pub fn comments_for_photo(&self, photo_id: Uuid) -> Result<Vec<CommentRow>, ContestError> {
        self.with_conn(|conn| query_comments_for_photo(conn, &photo_id.to_string()))
    }
}

pub(crate) fn query_comments_for_photo(
    conn: &Connection,
    photo_id: &str,
) -> Result<Vec<CommentRow>, ContestError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.photo_id, c.user_id, u.username, c.content, c.status, c.created_at
         FROM comments c
         LEFT JOIN users u ON c.user_id = u.id
         WHERE c.photo_id = ?1 AND c.status != ?2
         ORDER BY c.created_at ASC, c.rowid ASC",
    )?;
    let rows = stmt
        .query_map((photo_id, CommentStatus::Removed.as_str()), comment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_comment(conn: &Connection, id: &str) -> Result<Option<CommentRow>, ContestError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.photo_id, c.user_id, u.username, c.content, c.status, c.created_at
         FROM comments c
         LEFT JOIN users u ON c.user_id = u.id
         WHERE c.id = ?1",
    )?;
    let row = stmt.query_row([id], comment_from_row).optional()?;
    Ok(row)
}
