//! Error taxonomy for registry and swarm operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HiveError>;

#[derive(Debug, Error)]
pub enum HiveError {
    /// A required field was missing or empty
    #[error("{0}")]
    Validation(String),

    #[error("Agent '{0}' already exists")]
    DuplicateName(String),

    #[error("Agent '{0}' not found")]
    NotFound(String),

    /// Snapshot read or write failure
    #[error("storage error: {0}")]
    Storage(String),

    /// The swarm runner failed or returned something unusable
    #[error("{0}")]
    Collaborator(String),
}

impl HiveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn collaborator(err: impl std::fmt::Display) -> Self {
        Self::Collaborator(err.to_string())
    }
}
