//! Types for operations and results

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use lnf_inventory::InventoryMode;
use lnf_report::{Sink, SinkTotals};
use lnf_types::{DecisionKind, Technology};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the orphans of a run were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryOrigin {
    /// Replayed from a checkpoint that carried the completion trailer
    Checkpoint,
    /// Replayed from a checkpoint left by an interrupted traversal
    PartialCheckpoint,
    /// Fresh traversal of the holding collection
    Traversal,
}

impl From<InventoryMode> for InventoryOrigin {
    fn from(mode: InventoryMode) -> Self {
        match mode {
            InventoryMode::Replay { complete: true } => Self::Checkpoint,
            InventoryMode::Replay { complete: false } => Self::PartialCheckpoint,
            InventoryMode::Traversal => Self::Traversal,
        }
    }
}

impl InventoryOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkpoint => "checkpoint",
            Self::PartialCheckpoint => "partial checkpoint",
            Self::Traversal => "traversal",
        }
    }
}

/// Outcome of a full resolve run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub holding_collection: String,
    pub source: InventoryOrigin,
    pub workers: usize,
    /// Orphans that reached a decision
    pub orphans: u64,
    /// Decisions per kind; every kind is present, possibly with zero
    pub decisions: BTreeMap<DecisionKind, u64>,
    /// Store reads that made a heuristic step give up
    pub read_failures: u64,
    pub sinks: SinkTotals,
    pub duration_ms: u64,
}

impl RunSummary {
    #[must_use]
    pub fn new(holding_collection: String, source: InventoryOrigin, workers: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            holding_collection,
            source,
            workers,
            orphans: 0,
            decisions: DecisionKind::ALL.into_iter().map(|kind| (kind, 0)).collect(),
            read_failures: 0,
            sinks: SinkTotals::default(),
            duration_ms: 0,
        }
    }

    /// Count one decided orphan
    pub fn add(&mut self, kind: DecisionKind, read_failures: usize) {
        self.orphans += 1;
        *self.decisions.entry(kind).or_insert(0) += 1;
        self.read_failures += read_failures as u64;
    }

    #[must_use]
    pub fn count(&self, kind: DecisionKind) -> u64 {
        self.decisions.get(&kind).copied().unwrap_or(0)
    }

    /// Orphans that ended up in the remediation script
    #[must_use]
    pub fn actionable(&self) -> u64 {
        self.decisions
            .iter()
            .filter(|(kind, _)| kind.is_actionable())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Result of enumerating orphans without resolving them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryReport {
    pub holding_collection: String,
    pub checkpoint: PathBuf,
    pub source: InventoryOrigin,
    pub orphans: u64,
}

/// What would happen to a single orphan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplainReport {
    pub orphan: String,
    pub technology: Option<Technology>,
    pub decision: DecisionKind,
    /// Artifact the line would be appended to
    pub sink: Sink,
    /// Line that a run would write
    pub line: String,
    pub read_failures: usize,
}

/// Technology label for a held path
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifyReport {
    pub held_path: String,
    pub technology: Option<Technology>,
    /// Whether the run-folder templates apply to this path
    pub run_folder_route: bool,
}
