//! Held path to canonical path reconstruction

use lnf_errors::ResolveError;
use lnf_types::path::{is_within, join_under, segments};
use lnf_types::{CandidateOrigin, CanonicalCandidate, OrphanObject};

/// Strips the holding-area prefix from a held path
///
/// With the default depth of three, `/seq/lostandfound/b17/12345/qc` becomes
/// `/seq/12345/qc`: the `seq`, `lostandfound` and batch segments belong to
/// the holding area itself.
#[derive(Debug, Clone)]
pub struct PathReconstructor {
    canonical_root: String,
    prefix_depth: usize,
}

impl PathReconstructor {
    #[must_use]
    pub fn new(canonical_root: impl Into<String>, prefix_depth: usize) -> Self {
        Self {
            canonical_root: canonical_root.into(),
            prefix_depth,
        }
    }

    /// Path the orphan would have had if it had only been misplaced
    ///
    /// # Errors
    ///
    /// Returns `MalformedOrphanPath` when the held path is shallower than the
    /// holding-area prefix.
    pub fn reconstruct(&self, orphan: &OrphanObject) -> Result<CanonicalCandidate, ResolveError> {
        let parts = segments(orphan.held_path());
        if parts.len() < self.prefix_depth {
            return Err(ResolveError::MalformedOrphanPath {
                path: orphan.to_string(),
                reason: format!(
                    "held path has {} segments, fewer than the {} stripped prefix segments",
                    parts.len(),
                    self.prefix_depth
                ),
            });
        }
        let collection = join_under(&self.canonical_root, &parts[self.prefix_depth..]);
        Ok(CanonicalCandidate::new(
            collection,
            orphan.name(),
            CandidateOrigin::Reconstructed,
        ))
    }

    /// Collections to try as move targets, deepest first
    ///
    /// Starts with the candidate's own collection and climbs towards the
    /// canonical root, which is never included.
    #[must_use]
    pub fn ancestors(&self, candidate: &CanonicalCandidate, walk: bool) -> Vec<String> {
        let root_depth = segments(&self.canonical_root).len();
        let parts = segments(candidate.collection());
        if !is_within(candidate.collection(), &self.canonical_root) || parts.len() <= root_depth {
            return Vec::new();
        }
        let shallowest = if walk { root_depth + 1 } else { parts.len() };
        (shallowest..=parts.len())
            .rev()
            .map(|depth| join_under("/", &parts[..depth]))
            .collect()
    }
}
