//! Errors raised while resolving a single orphan
//!
//! None of these abort a run. They end the current heuristic step and the
//! pipeline moves on to the next one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolveError {
    #[error("malformed orphan path {path}: {reason}")]
    MalformedOrphanPath { path: String, reason: String },

    #[error("unknown technology: {name}")]
    UnknownTechnology { name: String },
}

impl ResolveError {
    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MalformedOrphanPath { .. } => "resolve.malformed_orphan_path",
            Self::UnknownTechnology { .. } => "resolve.unknown_technology",
        };
        Some(code)
    }
}
