//! Shared fixtures for the module tests.

use uuid::Uuid;

use snapshow_types::api::Actor;
use snapshow_types::roles::{PhotoStatus, Role};

use crate::Database;

pub fn mk_user(db: &Database, name: &str, role: Role) -> Actor {
    let id = Uuid::new_v4();
    db.create_user(
        &id.to_string(),
        name,
        &format!("{}@example.com", name.to_lowercase()),
        "argon2id-hash-placeholder",
        role.as_str(),
    )
    .unwrap();
    Actor { id, role }
}

pub fn mk_photo(db: &Database, owner: &Actor, title: &str) -> Uuid {
    let row = db
        .submit_photo(owner, title, None, "photo.jpg")
        .unwrap();
    row.id.parse().unwrap()
}

pub fn approve(db: &Database, admin: &Actor, photo: Uuid) {
    db.set_photo_status(admin, photo, PhotoStatus::Approved)
        .unwrap();
}
