use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account roles. A user holds exactly one role; overlapping permissions
/// are expressed through [`Capability`] checks rather than a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Participant,
    Voter,
    Admin,
}

/// A named permission a role may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Submit photos into the contest.
    SubmitPhoto,
    /// Cast votes on approved photos.
    Vote,
    /// Approve, reject, or revert photos.
    Moderate,
}

impl Role {
    /// Static capability table. Participants submit and vote, voters only
    /// vote, admins moderate and vote (but do not compete).
    pub fn has(self, cap: Capability) -> bool {
        match (self, cap) {
            (Role::Participant, Capability::SubmitPhoto) => true,
            (Role::Participant, Capability::Vote) => true,
            (Role::Voter, Capability::Vote) => true,
            (Role::Admin, Capability::Vote) => true,
            (Role::Admin, Capability::Moderate) => true,
            _ => false,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    /// Admin accounts are seeded out-of-band; a registration that asks for
    /// admin is downgraded to participant.
    pub fn for_registration(self) -> Role {
        match self {
            Role::Admin => Role::Participant,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Participant => "participant",
            Role::Voter => "voter",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(Role::Participant),
            "voter" => Ok(Role::Voter),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Photo moderation lifecycle. Every photo starts pending; admins may move
/// it to any state from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStatus {
    Pending,
    Approved,
    Rejected,
}

impl PhotoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoStatus::Pending => "pending",
            PhotoStatus::Approved => "approved",
            PhotoStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for PhotoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PhotoStatus::Pending),
            "approved" => Ok(PhotoStatus::Approved),
            "rejected" => Ok(PhotoStatus::Rejected),
            other => Err(format!("unknown photo status: {other}")),
        }
    }
}

impl fmt::Display for PhotoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comment states. The platform only produces `active`; flagged/removed
/// are reserved for future moderation tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Active,
    Flagged,
    Removed,
}

impl CommentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Active => "active",
            CommentStatus::Flagged => "flagged",
            CommentStatus::Removed => "removed",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CommentStatus::Active),
            "flagged" => Ok(CommentStatus::Flagged),
            "removed" => Ok(CommentStatus::Removed),
            other => Err(format!("unknown comment status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voting_capability_overlaps_roles() {
        assert!(Role::Participant.has(Capability::Vote));
        assert!(Role::Voter.has(Capability::Vote));
        assert!(Role::Admin.has(Capability::Vote));
    }

    #[test]
    fn only_participants_submit() {
        assert!(Role::Participant.has(Capability::SubmitPhoto));
        assert!(!Role::Voter.has(Capability::SubmitPhoto));
        assert!(!Role::Admin.has(Capability::SubmitPhoto));
    }

    #[test]
    fn only_admins_moderate() {
        assert!(Role::Admin.has(Capability::Moderate));
        assert!(!Role::Participant.has(Capability::Moderate));
        assert!(!Role::Voter.has(Capability::Moderate));
    }

    #[test]
    fn registration_downgrades_admin() {
        assert_eq!(Role::Admin.for_registration(), Role::Participant);
        assert_eq!(Role::Voter.for_registration(), Role::Voter);
        assert_eq!(Role::Participant.for_registration(), Role::Participant);
    }

    #[test]
    fn role_round_trips_through_db_text() {
        for role in [Role::Participant, Role::Voter, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
