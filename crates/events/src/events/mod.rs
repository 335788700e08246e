use serde::{Deserialize, Serialize};

use crate::EventSource;
use lnf_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod inventory;
pub mod resolve;
pub mod run;

pub use general::*;
pub use inventory::*;
pub use resolve::*;
pub use run::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors, debug output and operation brackets
    General(GeneralEvent),

    /// Holding collection traversal and checkpointing
    Inventory(InventoryEvent),

    /// Per-orphan pipeline progress
    Resolve(ResolveEvent),

    /// Whole-run lifecycle
    Run(RunEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Inventory(_) => EventSource::INVENTORY,
            Self::Resolve(_) => EventSource::RESOLVE,
            Self::Run(_) => EventSource::RUN,
        }
    }

    /// Orphan this event is about, when it concerns exactly one
    #[must_use]
    pub fn correlation(&self) -> Option<&str> {
        match self {
            Self::Resolve(event) => Some(event.orphan()),
            Self::Inventory(InventoryEvent::OrphanDiscovered { path }) => Some(path),
            _ => None,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Run(RunEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Inventory(InventoryEvent::CheckpointIncomplete { .. })
            | Self::Resolve(ResolveEvent::StoreReadFailed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Inventory(InventoryEvent::OrphanDiscovered { .. })
            | Self::Resolve(
                ResolveEvent::OrphanStarted { .. }
                | ResolveEvent::StepSkipped { .. }
                | ResolveEvent::ContentSearchMisses { .. },
            )
            | Self::Run(RunEvent::OrphanRecorded { .. }) => Level::DEBUG,

            Self::Resolve(ResolveEvent::CandidateProbed { .. }) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "lnf::events::general",
            Self::Inventory(_) => "lnf::events::inventory",
            Self::Resolve(_) => "lnf::events::resolve",
            Self::Run(_) => "lnf::events::run",
        }
    }
}
