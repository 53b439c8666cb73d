//! Crate-wide error type.
//!
//! Candidate caps and bad offset mappings are deliberately *not* errors:
//! exceeding a cap degrades to a best-effort candidate set, and a sentence
//! with a broken `norm_to_orig` mapping simply contributes no matches.

/// Errors surfaced by the engine and the on-disk formats.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not what its magic or header claims it to be.
    #[error("invalid {kind} file: {reason}")]
    InvalidFormat {
        kind: &'static str,
        reason: String,
    },

    /// The file opened fine but a record region read ran off the end.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// No sentence with this id exists in the store.
    #[error("sentence {0} not found")]
    NotFound(u32),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidFormat {
            kind,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
