use rusqlite::Connection;
use tracing::info;

use crate::error::ContestError;

pub fn run(conn: &Connection) -> Result<(), ContestError> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL UNIQUE,
                username        TEXT NOT NULL,
                password        TEXT NOT NULL,
                role            TEXT NOT NULL DEFAULT 'participant',
                bio             TEXT,
                profile_picture TEXT,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE photos (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                title       TEXT NOT NULL,
                description TEXT,
                filename    TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'pending',
                votes_count INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_photos_status
                ON photos(status, votes_count DESC);
            CREATE INDEX idx_photos_owner
                ON photos(user_id, created_at);

            CREATE TABLE votes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                photo_id    TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                voted_at    TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, photo_id)
            );

            CREATE INDEX idx_votes_photo
                ON votes(photo_id);

            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                photo_id    TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                content     TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'active',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_comments_photo
                ON comments(photo_id, created_at);

            CREATE TABLE notifications (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                message     TEXT NOT NULL,
                is_read     INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_notifications_user
                ON notifications(user_id, is_read);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
