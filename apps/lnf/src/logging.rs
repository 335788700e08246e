//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields. The
//! level comes from the event metadata, so per-orphan chatter stays at
//! debug/trace and only surfaces when the filter asks for it.

use lnf_events::{AppEvent, EventMessage, GeneralEvent, InventoryEvent, ResolveEvent, RunEvent};
use tracing::Level;

/// Dispatch a tracing event at a level only known at runtime
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let level = meta.tracing_level();

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    context = ?context,
                    "{message}"
                );
            }
            GeneralEvent::Error { message, details } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    details = ?details,
                    "{message}"
                );
            }
            GeneralEvent::DebugLog { message, context } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    context = ?context,
                    "{message}"
                );
            }
            GeneralEvent::OperationStarted { operation } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    operation = %operation,
                    "Operation started"
                );
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, error } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    operation = %operation,
                    error = %error,
                    "Operation failed"
                );
            }
        },

        AppEvent::Inventory(event) => match event {
            InventoryEvent::TraversalStarted {
                collection,
                checkpoint,
            } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    collection = %collection,
                    checkpoint = %checkpoint.display(),
                    "Traversing holding collection"
                );
            }
            InventoryEvent::OrphanDiscovered { path } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    path = %path,
                    "Orphan discovered"
                );
            }
            InventoryEvent::CheckpointReplayed {
                checkpoint,
                entries,
            } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    checkpoint = %checkpoint.display(),
                    entries = entries,
                    "Checkpoint replayed"
                );
            }
            InventoryEvent::CheckpointIncomplete {
                checkpoint,
                entries,
            } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    checkpoint = %checkpoint.display(),
                    entries = entries,
                    "Checkpoint has no completion trailer; replaying the orphans it lists"
                );
            }
            InventoryEvent::Finished { orphans, replayed } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    orphans = orphans,
                    replayed = replayed,
                    "Inventory finished"
                );
            }
        },

        AppEvent::Resolve(event) => {
            let correlation = meta.correlation_id.as_deref();
            match event {
                ResolveEvent::OrphanStarted { orphan } => {
                    event_at!(
                        level,
                        source = meta.source.as_str(),
                        correlation = ?correlation,
                        orphan = %orphan,
                        "Resolving orphan"
                    );
                }
                ResolveEvent::StepSkipped {
                    orphan,
                    step,
                    reason,
                } => {
                    event_at!(
                        level,
                        source = meta.source.as_str(),
                        correlation = ?correlation,
                        orphan = %orphan,
                        step = %step,
                        reason = %reason,
                        "Heuristic step skipped"
                    );
                }
                ResolveEvent::CandidateProbed {
                    orphan,
                    step,
                    candidate,
                    exists,
                } => {
                    event_at!(
                        level,
                        source = meta.source.as_str(),
                        correlation = ?correlation,
                        orphan = %orphan,
                        step = %step,
                        candidate = %candidate,
                        exists = exists,
                        "Candidate probed"
                    );
                }
                ResolveEvent::ContentSearchMisses { orphan, returned } => {
                    event_at!(
                        level,
                        source = meta.source.as_str(),
                        correlation = ?correlation,
                        orphan = %orphan,
                        returned = returned,
                        "Content search returned no usable copy"
                    );
                }
                ResolveEvent::DecisionReached { orphan, decision } => {
                    event_at!(
                        level,
                        source = meta.source.as_str(),
                        correlation = ?correlation,
                        orphan = %orphan,
                        decision = decision.as_str(),
                        "Decision reached"
                    );
                }
                ResolveEvent::StoreReadFailed {
                    orphan,
                    step,
                    failure,
                } => {
                    event_at!(
                        level,
                        source = meta.source.as_str(),
                        correlation = ?correlation,
                        orphan = %orphan,
                        step = %step,
                        retryable = failure.retryable,
                        code = ?failure.code,
                        message = %failure.message,
                        "Store read failed"
                    );
                }
            }
        }

        AppEvent::Run(event) => match event {
            RunEvent::Started {
                holding_collection,
                workers,
            } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    holding_collection = %holding_collection,
                    workers = workers,
                    "Run started"
                );
            }
            RunEvent::OrphanRecorded { processed } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    processed = processed,
                    "Orphan recorded"
                );
            }
            RunEvent::Completed {
                processed,
                actionable,
                elapsed_ms,
            } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    processed = processed,
                    actionable = actionable,
                    elapsed_ms = elapsed_ms,
                    "Run completed"
                );
            }
            RunEvent::Failed { failure } => {
                event_at!(
                    level,
                    source = meta.source.as_str(),
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Run failed"
                );
            }
        },
    }
}
