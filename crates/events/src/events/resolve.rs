use serde::{Deserialize, Serialize};
use std::fmt;

use lnf_types::DecisionKind;

use super::FailureContext;

/// Stage of the per-orphan resolution pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStep {
    Reconstruct,
    AncestorWalk,
    Classify,
    RunFolder,
    TechnologySplice,
    Verify,
    ContentSearch,
}

impl fmt::Display for ResolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reconstruct => "reconstruct",
            Self::AncestorWalk => "ancestor_walk",
            Self::Classify => "classify",
            Self::RunFolder => "run_folder",
            Self::TechnologySplice => "technology_splice",
            Self::Verify => "verify",
            Self::ContentSearch => "content_search",
        };
        f.write_str(name)
    }
}

/// Events raised while deciding the fate of a single orphan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolveEvent {
    OrphanStarted {
        orphan: String,
    },

    /// A stage produced nothing for this orphan and the pipeline moved on
    StepSkipped {
        orphan: String,
        step: ResolveStep,
        reason: String,
    },

    CandidateProbed {
        orphan: String,
        step: ResolveStep,
        candidate: String,
        exists: bool,
    },

    /// Content search returned objects that were rejected
    ContentSearchMisses {
        orphan: String,
        returned: usize,
    },

    DecisionReached {
        orphan: String,
        decision: DecisionKind,
    },

    /// A store read failed; treated as "not found" for this stage only
    StoreReadFailed {
        orphan: String,
        step: ResolveStep,
        failure: FailureContext,
    },
}

impl ResolveEvent {
    /// Held path of the orphan the event concerns
    #[must_use]
    pub fn orphan(&self) -> &str {
        match self {
            Self::OrphanStarted { orphan }
            | Self::StepSkipped { orphan, .. }
            | Self::CandidateProbed { orphan, .. }
            | Self::ContentSearchMisses { orphan, .. }
            | Self::DecisionReached { orphan, .. }
            | Self::StoreReadFailed { orphan, .. } => orphan,
        }
    }
}
