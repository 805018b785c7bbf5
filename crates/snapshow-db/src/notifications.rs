use rusqlite::Row;
use tracing::warn;
use uuid::Uuid;

use snapshow_types::api::Actor;

use crate::Database;
use crate::error::ContestError;
use crate::models::NotificationRow;

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        is_read: row.get::<_, i64>(3)? != 0,
        created_at: row.get(4)?,
    })
}

impl Database {
    /// Insert an unread notification. Every call creates a new row; there
    /// is no de-duplication.
    pub fn notify(&self, user_id: &str, message: &str) -> Result<(), ContestError> {
        let id = Uuid::new_v4().to_string();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, user_id, message) VALUES (?1, ?2, ?3)",
                (&id, user_id, message),
            )?;
            Ok(())
        })
    }

    /// Notifications are advisory: a failure here is logged and swallowed
    /// so it can never undo the mutation that triggered it.
    pub fn notify_best_effort(&self, user_id: &str, message: &str) {
        if let Err(e) = self.notify(user_id, message) {
            warn!("Failed to notify user {}: {:#}", user_id, e);
        }
    }

    /// Unread notifications, newest first (insertion order breaks
    /// same-second ties).
    pub fn list_unread(&self, user_id: &str) -> Result<Vec<NotificationRow>, ContestError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, message, is_read, created_at
                 FROM notifications
                 WHERE user_id = ?1 AND is_read = 0
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], notification_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Flip a single notification to read. Only the addressee may do
    /// this, and there is no way back to unread.
    pub fn mark_read(&self, actor: &Actor, notification_id: Uuid) -> Result<(), ContestError> {
        self.with_conn_mut(|conn| {
            let owner: Option<String> = {
                use rusqlite::OptionalExtension;
                conn.query_row(
                    "SELECT user_id FROM notifications WHERE id = ?1",
                    [notification_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?
            };

            let owner = owner.ok_or(ContestError::NotFound("notification"))?;
            if owner != actor.id.to_string() {
                return Err(ContestError::Forbidden(
                    "you can only manage your own notifications",
                ));
            }

            conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1",
                [notification_id.to_string()],
            )?;
            Ok(())
        })
    }

    /// Flip every unread notification for a user. Returns how many
    /// changed.
    pub fn mark_all_read(&self, user_id: &str) -> Result<usize, ContestError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
                [user_id],
            )?;
            Ok(changed)
        })
    }
}
