//! Inventory and checkpoint error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InventoryError {
    #[error("checkpoint {path} unreadable: {message}")]
    CheckpointUnreadable { path: String, message: String },

    #[error("failed to append to checkpoint {path}: {message}")]
    CheckpointWrite { path: String, message: String },

    #[error("malformed checkpoint entry on line {line}: {entry}")]
    MalformedEntry { line: usize, entry: String },
}

impl UserFacingError for InventoryError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CheckpointUnreadable { .. } => {
                Some("Fix the checkpoint file permissions or delete it to force a fresh traversal.")
            }
            Self::CheckpointWrite { .. } => {
                Some("Ensure the checkpoint directory is writable before rerunning.")
            }
            Self::MalformedEntry { .. } => {
                Some("Each checkpoint line must be an absolute collection path followed by /name.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CheckpointWrite { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CheckpointUnreadable { .. } => "inventory.checkpoint_unreadable",
            Self::CheckpointWrite { .. } => "inventory.checkpoint_write",
            Self::MalformedEntry { .. } => "inventory.malformed_entry",
        };
        Some(code)
    }
}
