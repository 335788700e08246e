//! Hypothesised canonical locations

use crate::path::ObjectPath;
use crate::technology::Technology;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which heuristic produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "technology", rename_all = "snake_case")]
pub enum CandidateOrigin {
    /// Held path with the holding-area prefix stripped
    Reconstructed,
    /// Ancestor collection of the reconstructed path
    Ancestor,
    /// `/seq/{run}` style active run folder
    DirectRunFolder,
    /// `/seq/illumina/runs/{xx}/{run}` style archive
    ArchivedRunFolder,
    /// Held path spliced at a technology token
    Technology(Technology),
}

impl fmt::Display for CandidateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconstructed => f.write_str("reconstructed"),
            Self::Ancestor => f.write_str("ancestor"),
            Self::DirectRunFolder => f.write_str("direct run folder"),
            Self::ArchivedRunFolder => f.write_str("archived run folder"),
            Self::Technology(tech) => write!(f, "{tech} path"),
        }
    }
}

/// A computed `{collection, name}` pair that may be the orphan's real home
///
/// Candidates only live while one orphan is being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCandidate {
    pub path: ObjectPath,
    pub origin: CandidateOrigin,
}

impl CanonicalCandidate {
    #[must_use]
    pub fn new(collection: impl Into<String>, name: impl Into<String>, origin: CandidateOrigin) -> Self {
        Self {
            path: ObjectPath::new(collection, name),
            origin,
        }
    }

    /// Parent collection of the candidate object
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.path.collection
    }
}
