//! Output artifact error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ReportError {
    #[error("failed to open {sink} at {path}: {message}")]
    SinkOpen {
        sink: String,
        path: String,
        message: String,
    },

    #[error("failed to write {sink}: {message}")]
    SinkWrite { sink: String, message: String },
}

impl ReportError {
    #[must_use]
    pub fn user_hint(&self) -> Option<&'static str> {
        Some("Check that the output paths are writable and the disk is not full.")
    }

    #[must_use]
    pub fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SinkOpen { .. } => "report.sink_open",
            Self::SinkWrite { .. } => "report.sink_write",
        };
        Some(code)
    }
}
