//! # Work Description Store Errors

use thiserror::Error;

/// Failures reading or writing work descriptions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Work description for message {message_id} already exists")]
    AlreadyExists { message_id: String },

    #[error("Work description for message {message_id} not found")]
    NotFound { message_id: String },

    #[error("Work description for message {message_id} is out of date: expected version {expected}, store has {actual}")]
    VersionConflict {
        message_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid {direction} status transition for message {message_id}: {from} -> {to}")]
    InvalidTransition {
        message_id: String,
        direction: &'static str,
        from: String,
        to: String,
    },

    #[error("Persistence store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Work description serialization error: {message}")]
    Serialization { message: String },

    #[error("Gave up persisting work description for message {message_id} after {attempts} attempts: {last_error}")]
    RetriesExceeded {
        message_id: String,
        attempts: u32,
        last_error: Box<StoreError>,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn not_found(message_id: impl Into<String>) -> Self {
        Self::NotFound {
            message_id: message_id.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether repeating the write (after refreshing the record) may succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. } | Self::Unavailable { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
