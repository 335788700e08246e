//! Per-orphan decisions

use crate::candidate::CandidateOrigin;
use crate::path::ObjectPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the canonical copy behind a `Remove` was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", content = "origin", rename_all = "snake_case")]
pub enum Evidence {
    Structural(CandidateOrigin),
    ContentSearch,
}

/// Why a `Move` target was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    /// Target is a run folder derived from the run id
    RunFolder,
    /// Target is a collection derived from the held path
    Collection,
}

/// Outcome for exactly one orphan in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Identical, correctly annotated content already exists at `existing`
    Remove {
        orphan: ObjectPath,
        existing: ObjectPath,
        evidence: Evidence,
    },
    /// The canonical collection exists but holds no such object
    Move {
        orphan: ObjectPath,
        target: String,
        reason: MoveReason,
    },
    KeepChecksumMismatch {
        orphan: ObjectPath,
        existing: ObjectPath,
    },
    KeepMetadataMissing {
        orphan: ObjectPath,
        existing: ObjectPath,
    },
    /// Both run folder templates exist and neither holds the object
    KeepAmbiguous {
        orphan: ObjectPath,
        direct: String,
        archived: String,
    },
    StillLost {
        orphan: ObjectPath,
    },
}

impl Decision {
    #[must_use]
    pub fn kind(&self) -> DecisionKind {
        match self {
            Self::Remove { .. } => DecisionKind::Remove,
            Self::Move { .. } => DecisionKind::Move,
            Self::KeepChecksumMismatch { .. } => DecisionKind::KeepChecksumMismatch,
            Self::KeepMetadataMissing { .. } => DecisionKind::KeepMetadataMissing,
            Self::KeepAmbiguous { .. } => DecisionKind::KeepAmbiguous,
            Self::StillLost { .. } => DecisionKind::StillLost,
        }
    }

    #[must_use]
    pub fn orphan(&self) -> &ObjectPath {
        match self {
            Self::Remove { orphan, .. }
            | Self::Move { orphan, .. }
            | Self::KeepChecksumMismatch { orphan, .. }
            | Self::KeepMetadataMissing { orphan, .. }
            | Self::KeepAmbiguous { orphan, .. }
            | Self::StillLost { orphan } => orphan,
        }
    }

    /// Whether the decision becomes an executable remediation line
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.kind().is_actionable()
    }
}

/// Decision without its payload, used for counting and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Remove,
    Move,
    KeepChecksumMismatch,
    KeepMetadataMissing,
    KeepAmbiguous,
    StillLost,
}

impl DecisionKind {
    pub const ALL: [DecisionKind; 6] = [
        Self::Remove,
        Self::Move,
        Self::KeepChecksumMismatch,
        Self::KeepMetadataMissing,
        Self::KeepAmbiguous,
        Self::StillLost,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Move => "move",
            Self::KeepChecksumMismatch => "keep_checksum_mismatch",
            Self::KeepMetadataMissing => "keep_metadata_missing",
            Self::KeepAmbiguous => "keep_ambiguous",
            Self::StillLost => "still_lost",
        }
    }

    #[must_use]
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::Remove | Self::Move)
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
