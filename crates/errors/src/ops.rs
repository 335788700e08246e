//! Operation orchestration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OpsError {
    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("worker task failed: {message}")]
    WorkerFailed { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl OpsError {
    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::WorkerFailed { .. } => "ops.worker_failed",
            Self::SerializationError { .. } => "ops.serialization_error",
        };
        Some(code)
    }
}
