use crate::storage::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("no members in {0}")]
    EmptyScope(String),

    #[error("backend failure: {0}")]
    BackendFailure(#[from] StoreError),
}

impl LeaderboardError {
    pub fn invalid(message: impl Into<String>) -> Self {
        LeaderboardError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;
