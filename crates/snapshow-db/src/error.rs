use thiserror::Error;

/// Expected, recoverable outcomes of core operations. Every variant maps
/// to a client-facing failure; `Internal` covers persistence faults.
#[derive(Debug, Error)]
pub enum ContestError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("{0}")]
    InvalidOperation(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl From<rusqlite::Error> for ContestError {
    fn from(e: rusqlite::Error) -> Self {
        if is_unique_violation(&e) {
            // Call sites with a better message map the constraint before
            // this catch-all sees it.
            ContestError::Conflict("resource already exists")
        } else {
            ContestError::Internal(e.into())
        }
    }
}
