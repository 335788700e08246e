//! Object store error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("read failed for {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("metadata query failed for {key}={value}: {message}")]
    QueryFailed {
        key: String,
        value: String,
        message: String,
    },

    #[error("invalid store path: {path}")]
    InvalidPath { path: String },

    #[error("corrupted metadata for {path}: {message}")]
    CorruptedMetadata { path: String, message: String },
}

impl StoreError {
    /// Convert an `io::Error` raised while touching `path`
    #[must_use]
    pub fn from_io_with_path(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_string(),
            },
            _ => Self::ReadFailed {
                path: path.to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl UserFacingError for StoreError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Unavailable { .. } => Some(
                "Check that the holding collection exists and the store root is reachable, or supply a checkpoint file.",
            ),
            Self::CorruptedMetadata { .. } => {
                Some("Inspect or rewrite the metadata record for the object named in the error.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::ReadFailed { .. } | Self::QueryFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Unavailable { .. } => "store.unavailable",
            Self::ReadFailed { .. } => "store.read_failed",
            Self::NotFound { .. } => "store.not_found",
            Self::QueryFailed { .. } => "store.query_failed",
            Self::InvalidPath { .. } => "store.invalid_path",
            Self::CorruptedMetadata { .. } => "store.corrupted_metadata",
        };
        Some(code)
    }
}
