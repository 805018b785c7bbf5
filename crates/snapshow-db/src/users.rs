use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::error::{ContestError, is_unique_violation};
use crate::models::UserRow;

const USER_COLUMNS: &str = "id, email, username, password, role, bio, profile_picture, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        bio: row.get(5)?,
        profile_picture: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<(), ContestError> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, username, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, email, username, password_hash, role),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ContestError::Conflict("email already registered")
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, ContestError> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>, ContestError> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Update display name and/or bio. Usernames are not unique, so no
    /// collision check applies here.
    pub fn update_profile(
        &self,
        user_id: &str,
        username: Option<&str>,
        bio: Option<&str>,
    ) -> Result<UserRow, ContestError> {
        self.with_conn_mut(|conn| {
            if let Some(name) = username {
                conn.execute(
                    "UPDATE users SET username = ?1 WHERE id = ?2",
                    (name, user_id),
                )?;
            }
            if let Some(bio) = bio {
                conn.execute("UPDATE users SET bio = ?1 WHERE id = ?2", (bio, user_id))?;
            }
            query_user(conn, "id", user_id)?.ok_or(ContestError::NotFound("user"))
        })
    }

    pub fn set_profile_picture(&self, user_id: &str, filename: &str) -> Result<(), ContestError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET profile_picture = ?1 WHERE id = ?2",
                (filename, user_id),
            )?;
            if changed == 0 {
                return Err(ContestError::NotFound("user"));
            }
            Ok(())
        })
    }

    /// Admin listing, registration order.
    pub fn list_users(&self) -> Result<Vec<UserRow>, ContestError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>, ContestError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::error::ContestError;

    #[test]
    fn duplicate_email_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "Ana", "ana@example.com", "hash", "participant")
            .unwrap();

        let err = db
            .create_user("u2", "Other Ana", "ana@example.com", "hash", "voter")
            .unwrap_err();
        assert!(matches!(err, ContestError::Conflict(_)));
    }

    #[test]
    fn usernames_are_not_unique() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "Sam", "sam1@example.com", "hash", "participant")
            .unwrap();
        db.create_user("u2", "Sam", "sam2@example.com", "hash", "voter")
            .unwrap();

        assert_eq!(db.list_users().unwrap().len(), 2);
    }

    #[test]
    fn profile_update_changes_only_given_fields() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "Ana", "ana@example.com", "hash", "participant")
            .unwrap();

        let row = db.update_profile("u1", None, Some("street shooter")).unwrap();
        assert_eq!(row.username, "Ana");
        assert_eq!(row.bio.as_deref(), Some("street shooter"));

        let row = db.update_profile("u1", Some("Ana B"), None).unwrap();
        assert_eq!(row.username, "Ana B");
        assert_eq!(row.bio.as_deref(), Some("street shooter"));
    }
}
