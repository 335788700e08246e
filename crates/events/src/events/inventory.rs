use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Orphan discovery, traversal and checkpoint events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryEvent {
    /// Live traversal of the holding collection began
    TraversalStarted {
        collection: String,
        checkpoint: PathBuf,
    },

    OrphanDiscovered {
        path: String,
    },

    /// Orphans were taken from an existing checkpoint instead of the store
    CheckpointReplayed {
        checkpoint: PathBuf,
        entries: usize,
    },

    /// The checkpoint has no completion trailer; a previous traversal was cut short
    CheckpointIncomplete {
        checkpoint: PathBuf,
        entries: usize,
    },

    Finished {
        orphans: usize,
        replayed: bool,
    },
}
