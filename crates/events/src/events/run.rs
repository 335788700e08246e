use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Whole-run lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        holding_collection: String,
        workers: usize,
    },

    /// One orphan left the pipeline and its record was written
    OrphanRecorded {
        processed: u64,
    },

    Completed {
        processed: u64,
        actionable: u64,
        elapsed_ms: u64,
    },

    Failed {
        failure: FailureContext,
    },
}
