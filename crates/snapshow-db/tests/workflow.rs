//! End-to-end exercise of the contest workflow against an in-memory
//! database: submission, moderation, voting, commenting, and the
//! notification trail they leave behind.

use uuid::Uuid;

use snapshow_db::{ContestError, Database};
use snapshow_types::api::Actor;
use snapshow_types::roles::{PhotoStatus, Role};

fn user(db: &Database, name: &str, role: Role) -> Actor {
    let id = Uuid::new_v4();
    db.create_user(
        &id.to_string(),
        name,
        &format!("{}@example.com", name.to_lowercase()),
        "hash",
        role.as_str(),
    )
    .unwrap();
    Actor { id, role }
}

#[test]
fn full_contest_round() {
    let db = Database::open_in_memory().unwrap();

    let admin = user(&db, "Root", Role::Admin);
    let ana = user(&db, "Ana", Role::Participant);
    let bob = user(&db, "Bob", Role::Participant);
    let viv = user(&db, "Viv", Role::Voter);

    // Two submissions enter the queue as pending.
    let ana_photo: Uuid = db
        .submit_photo(&ana, "Harbor at dawn", Some("Long exposure"), "a.jpg")
        .unwrap()
        .id
        .parse()
        .unwrap();
    let bob_photo: Uuid = db
        .submit_photo(&bob, "Night market", None, "b.jpg")
        .unwrap()
        .id
        .parse()
        .unwrap();

    let queue = db.photos_by_status(&admin, PhotoStatus::Pending).unwrap();
    assert_eq!(queue.len(), 2);

    // Nothing pending shows in the gallery, and pending photos take no votes.
    assert!(db.list_gallery(1, 12).unwrap().is_empty());
    assert!(matches!(
        db.cast_vote(&viv, ana_photo).unwrap_err(),
        ContestError::InvalidState(_)
    ));

    // Approve one, reject the other.
    db.set_photo_status(&admin, ana_photo, PhotoStatus::Approved)
        .unwrap();
    db.set_photo_status(&admin, bob_photo, PhotoStatus::Rejected)
        .unwrap();

    let gallery = db.list_gallery(1, 12).unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0].title, "Harbor at dawn");

    // Votes: a voter and a rival participant may vote, the owner may not,
    // and nobody votes twice.
    assert_eq!(db.cast_vote(&viv, ana_photo).unwrap(), 1);
    assert_eq!(db.cast_vote(&bob, ana_photo).unwrap(), 2);
    assert!(matches!(
        db.cast_vote(&ana, ana_photo).unwrap_err(),
        ContestError::InvalidOperation(_)
    ));
    assert!(matches!(
        db.cast_vote(&viv, ana_photo).unwrap_err(),
        ContestError::Conflict(_)
    ));
    assert_eq!(db.stored_vote_count(ana_photo).unwrap(), 2);
    assert_eq!(
        db.get_photo(ana_photo).unwrap().unwrap().votes_count,
        db.stored_vote_count(ana_photo).unwrap()
    );

    // Comments land chronologically and show author names.
    db.post_comment(&viv, ana_photo, "nice!").unwrap();
    db.post_comment(&bob, ana_photo, "well deserved").unwrap();
    let comments = db.comments_for_photo(ana_photo).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content, "nice!");
    assert_eq!(comments[0].author_username, "Viv");
    assert_eq!(comments[1].content, "well deserved");

    // Ana's notification trail: submission, approval, two votes, two
    // comments. Newest first.
    let unread = db.list_unread(&ana.id.to_string()).unwrap();
    assert_eq!(unread.len(), 6);
    assert!(unread.last().unwrap().message.contains("submitted for review"));

    // She clears them; a second sweep has nothing left to do.
    assert_eq!(db.mark_all_read(&ana.id.to_string()).unwrap(), 6);
    assert!(db.list_unread(&ana.id.to_string()).unwrap().is_empty());

    // Reverting the rejected photo puts it back in the review queue.
    db.set_photo_status(&admin, bob_photo, PhotoStatus::Pending)
        .unwrap();
    let queue = db.photos_by_status(&admin, PhotoStatus::Pending).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].title, "Night market");

    // Leaderboard reflects the single approved, twice-voted photo.
    let board = db.leaderboard(20).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].votes_count, 2);
    assert_eq!(board[0].owner_username.as_deref(), Some("Ana"));
}

#[test]
fn vote_counts_survive_a_moderation_cycle() {
    let db = Database::open_in_memory().unwrap();
    let admin = user(&db, "Root", Role::Admin);
    let ana = user(&db, "Ana", Role::Participant);
    let viv = user(&db, "Viv", Role::Voter);

    let photo: Uuid = db
        .submit_photo(&ana, "Dunes", None, "d.jpg")
        .unwrap()
        .id
        .parse()
        .unwrap();
    db.set_photo_status(&admin, photo, PhotoStatus::Approved)
        .unwrap();
    db.cast_vote(&viv, photo).unwrap();

    // Vote rows are immutable: pulling the photo from the gallery and
    // putting it back does not touch the ledger.
    db.set_photo_status(&admin, photo, PhotoStatus::Rejected)
        .unwrap();
    db.set_photo_status(&admin, photo, PhotoStatus::Approved)
        .unwrap();

    assert_eq!(db.stored_vote_count(photo).unwrap(), 1);
    assert_eq!(db.get_photo(photo).unwrap().unwrap().votes_count, 1);

    // And the earlier vote still blocks a duplicate.
    assert!(matches!(
        db.cast_vote(&viv, photo).unwrap_err(),
        ContestError::Conflict(_)
    ));
}
