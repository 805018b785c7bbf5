use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use snapshow_types::api::Actor;
use snapshow_types::roles::{Capability, PhotoStatus};

use crate::Database;
use crate::error::{ContestError, is_unique_violation};

impl Database {
    /// Cast a vote on an approved photo. Checks run in a fixed order so
    /// callers get the most specific failure: photo exists, voter holds
    /// the vote capability, photo is approved, voter is not the owner,
    /// no prior vote. The insert and the counter increment commit in one
    /// transaction; the UNIQUE(user_id, photo_id) constraint is the final
    /// arbiter under concurrent attempts, the pre-read only buys a precise
    /// message.
    ///
    /// Returns the photo's new vote count.
    pub fn cast_vote(&self, actor: &Actor, photo_id: Uuid) -> Result<i64, ContestError> {
        let vote_id = Uuid::new_v4().to_string();
        let voter_id = actor.id.to_string();

        let (count, owner_id, title) = self.with_conn_mut(|conn| {
            let tx = conn.transaction().map_err(ContestError::from)?;

            let (pid, owner_id, title, status): (String, String, String, String) = tx
                .query_row(
                    "SELECT id, user_id, title, status FROM photos WHERE id = ?1",
                    [photo_id.to_string()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?
                .ok_or(ContestError::NotFound("photo"))?;

            if !actor.role.has(Capability::Vote) {
                return Err(ContestError::Forbidden("you do not have permission to vote"));
            }
            if status.parse::<PhotoStatus>().ok() != Some(PhotoStatus::Approved) {
                return Err(ContestError::InvalidState("only approved photos accept votes"));
            }
            if owner_id == voter_id {
                return Err(ContestError::InvalidOperation(
                    "you cannot vote for your own photo",
                ));
            }
            if vote_exists(&tx, &voter_id, &pid)? {
                return Err(ContestError::Conflict("you have already voted for this photo"));
            }

            tx.execute(
                "INSERT INTO votes (id, user_id, photo_id) VALUES (?1, ?2, ?3)",
                (&vote_id, &voter_id, &pid),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ContestError::Conflict("you have already voted for this photo")
                } else {
                    e.into()
                }
            })?;
            tx.execute(
                "UPDATE photos SET votes_count = votes_count + 1 WHERE id = ?1",
                [&pid],
            )?;
            let count: i64 = tx.query_row(
                "SELECT votes_count FROM photos WHERE id = ?1",
                [&pid],
                |row| row.get(0),
            )?;

            tx.commit().map_err(ContestError::from)?;
            Ok((count, owner_id, title))
        })?;

        self.notify_best_effort(
            &owner_id,
            &format!("Your photo \"{}\" received a new vote!", title),
        );

        Ok(count)
    }

    pub fn has_voted(&self, user_id: Uuid, photo_id: Uuid) -> Result<bool, ContestError> {
        self.with_conn(|conn| vote_exists(conn, &user_id.to_string(), &photo_id.to_string()))
    }

    /// Count vote rows directly, bypassing the cached counter.
    pub fn stored_vote_count(&self, photo_id: Uuid) -> Result<i64, ContestError> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM votes WHERE photo_id = ?1",
                [photo_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

pub(crate) fn vote_exists(
    conn: &Connection,
    user_id: &str,
    photo_id: &str,
) -> Result<bool, ContestError> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM votes WHERE user_id = ?1 AND photo_id = ?2",
            (user_id, photo_id),
            |row| row.get(0),
        )
        .optional()?;
    Ok(existing.is_some())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snapshow_types::roles::{PhotoStatus, Role};
    use uuid::Uuid;

    use crate::Database;
    use crate::error::ContestError;
    use crate::test_support::{approve, mk_photo, mk_user};

    #[test]
    fn vote_on_missing_photo_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let viv = mk_user(&db, "Viv", Role::Voter);
        let err = db.cast_vote(&viv, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ContestError::NotFound(_)));
    }

    #[test]
    fn all_roles_can_vote() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let photo = mk_photo(&db, &ana, "Dunes");
        approve(&db, &admin, photo);

        let viv = mk_user(&db, "Viv", Role::Voter);
        let pat = mk_user(&db, "Pat", Role::Participant);

        assert_eq!(db.cast_vote(&viv, photo).unwrap(), 1);
        assert_eq!(db.cast_vote(&pat, photo).unwrap(), 2);
        assert_eq!(db.cast_vote(&admin, photo).unwrap(), 3);
    }

    #[test]
    fn unapproved_photos_reject_votes() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let viv = mk_user(&db, "Viv", Role::Voter);
        let photo = mk_photo(&db, &ana, "Dunes");

        // pending
        let err = db.cast_vote(&viv, photo).unwrap_err();
        assert!(matches!(err, ContestError::InvalidState(_)));

        // rejected
        db.set_photo_status(&admin, photo, PhotoStatus::Rejected)
            .unwrap();
        let err = db.cast_vote(&viv, photo).unwrap_err();
        assert!(matches!(err, ContestError::InvalidState(_)));
    }

    #[test]
    fn self_vote_always_fails_regardless_of_status() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let photo = mk_photo(&db, &ana, "Dunes");
        approve(&db, &admin, photo);

        let err = db.cast_vote(&ana, photo).unwrap_err();
        assert!(matches!(err, ContestError::InvalidOperation(_)));
        assert_eq!(db.stored_vote_count(photo).unwrap(), 0);
    }

    #[test]
    fn double_vote_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let viv = mk_user(&db, "Viv", Role::Voter);
        let photo = mk_photo(&db, &ana, "Dunes");
        approve(&db, &admin, photo);

        assert_eq!(db.cast_vote(&viv, photo).unwrap(), 1);
        let err = db.cast_vote(&viv, photo).unwrap_err();
        assert!(matches!(err, ContestError::Conflict(_)));

        // counter and ledger agree after the failed attempt
        assert_eq!(db.stored_vote_count(photo).unwrap(), 1);
        assert_eq!(db.get_photo(photo).unwrap().unwrap().votes_count, 1);
    }

    #[test]
    fn cached_count_matches_ledger_after_many_votes() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let photo = mk_photo(&db, &ana, "Dunes");
        approve(&db, &admin, photo);

        for i in 0..7 {
            let voter = mk_user(&db, &format!("V{i}"), Role::Voter);
            db.cast_vote(&voter, photo).unwrap();
        }

        let cached = db.get_photo(photo).unwrap().unwrap().votes_count;
        assert_eq!(cached, 7);
        assert_eq!(db.stored_vote_count(photo).unwrap(), cached);
    }

    #[test]
    fn concurrent_double_votes_yield_one_success() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let viv = mk_user(&db, "Viv", Role::Voter);
        let photo = mk_photo(&db, &ana, "Dunes");
        approve(&db, &admin, photo);

        const ATTEMPTS: usize = 8;
        let mut handles = Vec::new();
        for _ in 0..ATTEMPTS {
            let db = db.clone();
            handles.push(std::thread::spawn(move || db.cast_vote(&viv, photo)));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => successes += 1,
                Err(ContestError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, ATTEMPTS - 1);
        assert_eq!(db.stored_vote_count(photo).unwrap(), 1);
        assert_eq!(db.get_photo(photo).unwrap().unwrap().votes_count, 1);
    }
}
