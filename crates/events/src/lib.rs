#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in lnf
//!
//! Library crates never print or log directly. They emit [`AppEvent`]s
//! wrapped in an [`EventMessage`] and the CLI decides what to render and
//! what to hand to tracing.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, FailureContext, GeneralEvent, InventoryEvent, ResolveEvent, ResolveStep, RunEvent,
};

use lnf_types::DecisionKind;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with the metadata captured when it was emitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Derive metadata from the event itself
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        if let Some(correlation) = event.correlation() {
            meta = meta.with_correlation_id(correlation);
        }
        Self::new(meta, event)
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout lnf
///
/// Implemented by the raw [`EventSender`] and by any context that carries
/// one, so stages can emit without caring which they were handed.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver may be gone during shutdown; nothing to do about it.
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    fn emit(&self, event: AppEvent) {
        let message = EventMessage::from_event(event);
        self.emit_with_meta(message.meta, message.event);
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    fn emit_step_skipped(
        &self,
        orphan: impl Into<String>,
        step: ResolveStep,
        reason: impl Into<String>,
    ) {
        self.emit(AppEvent::Resolve(ResolveEvent::StepSkipped {
            orphan: orphan.into(),
            step,
            reason: reason.into(),
        }));
    }

    fn emit_candidate_probed(
        &self,
        orphan: impl Into<String>,
        step: ResolveStep,
        candidate: impl Into<String>,
        exists: bool,
    ) {
        self.emit(AppEvent::Resolve(ResolveEvent::CandidateProbed {
            orphan: orphan.into(),
            step,
            candidate: candidate.into(),
            exists,
        }));
    }

    fn emit_store_read_failed<E: lnf_errors::UserFacingError + ?Sized>(
        &self,
        orphan: impl Into<String>,
        step: ResolveStep,
        error: &E,
    ) {
        self.emit(AppEvent::Resolve(ResolveEvent::StoreReadFailed {
            orphan: orphan.into(),
            step,
            failure: FailureContext::from_error(error),
        }));
    }

    fn emit_decision(&self, orphan: impl Into<String>, decision: DecisionKind) {
        self.emit(AppEvent::Resolve(ResolveEvent::DecisionReached {
            orphan: orphan.into(),
            decision,
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
