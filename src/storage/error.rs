use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by a ranking backend.
///
/// Serializable so a store node can hand the exact failure back to a remote client.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreError {
    #[error("key {key} holds the wrong kind of value")]
    WrongType { key: String },

    #[error("score for {member} in {key} is not a finite number")]
    InvalidScore { key: String, member: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("store protocol error: {message}")]
    Protocol { message: String },

    #[error("store rejected credentials")]
    Unauthorized,
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::protocol(e.to_string())
        } else {
            StoreError::unavailable(e.to_string())
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
