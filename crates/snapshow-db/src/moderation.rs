use uuid::Uuid;

use snapshow_types::api::Actor;
use snapshow_types::roles::{Capability, PhotoStatus};

use crate::Database;
use crate::error::ContestError;
use crate::models::PhotoRow;
use crate::photos::query_photo;

impl Database {
    /// Move a photo to `status`. Admin transitions are total: any state is
    /// reachable from any state, and re-asserting the current state is
    /// allowed (last writer wins). Exactly one notification goes to the
    /// photo owner per successful transition; its failure is logged and
    /// never undoes the transition.
    pub fn set_photo_status(
        &self,
        actor: &Actor,
        photo_id: Uuid,
        status: PhotoStatus,
    ) -> Result<PhotoRow, ContestError> {
        if !actor.role.has(Capability::Moderate) {
            return Err(ContestError::Forbidden("admin access required"));
        }

        let photo = self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE photos SET status = ?1 WHERE id = ?2",
                (status.as_str(), photo_id.to_string()),
            )?;
            if changed == 0 {
                return Err(ContestError::NotFound("photo"));
            }
            query_photo(conn, &photo_id.to_string())?.ok_or(ContestError::NotFound("photo"))
        })?;

        self.notify_best_effort(&photo.user_id, &transition_message(&photo.title, status));

        Ok(photo)
    }
}

fn transition_message(title: &str, status: PhotoStatus) -> String {
    match status {
        PhotoStatus::Approved => format!("Your photo \"{title}\" has been approved!"),
        PhotoStatus::Rejected => format!("Your photo \"{title}\" has been rejected."),
        PhotoStatus::Pending => {
            format!("Your photo \"{title}\" has been reverted to pending status.")
        }
    }
}

#[cfg(test)]
mod tests {
    use snapshow_types::roles::{PhotoStatus, Role};
    use uuid::Uuid;

    use crate::Database;
    use crate::error::ContestError;
    use crate::test_support::{mk_photo, mk_user};

    #[test]
    fn non_admins_cannot_moderate() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let viv = mk_user(&db, "Viv", Role::Voter);
        let photo = mk_photo(&db, &ana, "Dunes");

        for actor in [&ana, &viv] {
            let err = db
                .set_photo_status(actor, photo, PhotoStatus::Approved)
                .unwrap_err();
            assert!(matches!(err, ContestError::Forbidden(_)));
        }

        // no state change happened
        let photo = db.get_photo(photo).unwrap().unwrap();
        assert_eq!(photo.status(), PhotoStatus::Pending);
    }

    #[test]
    fn missing_photo_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let admin = mk_user(&db, "Root", Role::Admin);
        let err = db
            .set_photo_status(&admin, Uuid::new_v4(), PhotoStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, ContestError::NotFound(_)));
    }

    #[test]
    fn transitions_are_total_and_each_notifies_once() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let photo = mk_photo(&db, &ana, "Dunes");

        // submission itself produced one notification
        let baseline = db.list_unread(&ana.id.to_string()).unwrap().len();

        let cycle = [
            PhotoStatus::Approved,
            PhotoStatus::Rejected,
            PhotoStatus::Pending,
            PhotoStatus::Approved,
        ];
        for (i, status) in cycle.into_iter().enumerate() {
            let row = db.set_photo_status(&admin, photo, status).unwrap();
            assert_eq!(row.status(), status);

            let unread = db.list_unread(&ana.id.to_string()).unwrap();
            assert_eq!(unread.len(), baseline + i + 1);
        }
    }

    #[test]
    fn reasserting_the_current_state_is_allowed() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let photo = mk_photo(&db, &ana, "Dunes");

        db.set_photo_status(&admin, photo, PhotoStatus::Approved)
            .unwrap();
        let row = db
            .set_photo_status(&admin, photo, PhotoStatus::Approved)
            .unwrap();
        assert_eq!(row.status(), PhotoStatus::Approved);
    }

    #[test]
    fn transition_wording_names_the_new_state() {
        let db = Database::open_in_memory().unwrap();
        let ana = mk_user(&db, "Ana", Role::Participant);
        let admin = mk_user(&db, "Root", Role::Admin);
        let photo = mk_photo(&db, &ana, "Dunes");

        db.set_photo_status(&admin, photo, PhotoStatus::Rejected)
            .unwrap();
        let unread = db.list_unread(&ana.id.to_string()).unwrap();
        // newest first
        assert!(unread[0].message.contains("rejected"));
    }
}
