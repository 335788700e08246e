//! Move target selection when no candidate object exists

use std::sync::Arc;

use lnf_errors::Error;
use lnf_store::Store;
use lnf_types::CanonicalCandidate;

/// What the parent collections of the candidates say
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentOutcome {
    /// No candidate collection exists
    Unresolved,
    /// Exactly one candidate collection exists
    Move(CanonicalCandidate),
    /// Both run-folder collections exist; picking one could misplace the object
    Ambiguous { direct: String, archived: String },
}

#[derive(Clone)]
pub struct MultiplicityResolver {
    store: Arc<dyn Store>,
}

impl MultiplicityResolver {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Check the parent collection of every candidate, in order
    ///
    /// # Errors
    ///
    /// Returns the first store error; a partial answer could turn an
    /// ambiguous case into a move.
    pub async fn resolve_parents(
        &self,
        candidates: &[&CanonicalCandidate],
    ) -> Result<ParentOutcome, Error> {
        let mut existing = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.store.collection_exists(candidate.collection()).await? {
                existing.push(*candidate);
            }
        }

        Ok(match existing.as_slice() {
            [] => ParentOutcome::Unresolved,
            [only] => ParentOutcome::Move((*only).clone()),
            [first, second, ..] => ParentOutcome::Ambiguous {
                direct: first.collection().to_string(),
                archived: second.collection().to_string(),
            },
        })
    }

    /// Deepest collection in `ancestors` (ordered deepest first) that exists
    ///
    /// # Errors
    ///
    /// Stops at the first store error; a shallower hit is not trustworthy if
    /// a deeper level could not be checked.
    pub async fn deepest_existing(&self, ancestors: &[String]) -> Result<Option<String>, Error> {
        for collection in ancestors {
            if self.store.collection_exists(collection).await? {
                return Ok(Some(collection.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnf_store::{FailureKind, MemoryStore};
    use lnf_types::CandidateOrigin;

    fn candidates() -> (CanonicalCandidate, CanonicalCandidate) {
        (
            CanonicalCandidate::new("/seq/12345", "12345_1.bam", CandidateOrigin::DirectRunFolder),
            CanonicalCandidate::new(
                "/seq/illumina/runs/12/12345",
                "12345_1.bam",
                CandidateOrigin::ArchivedRunFolder,
            ),
        )
    }

    #[tokio::test]
    async fn no_parent_is_unresolved() {
        let store = MemoryStore::new();
        store.add_collection("/seq");
        let (direct, archived) = candidates();
        let outcome = MultiplicityResolver::new(Arc::new(store))
            .resolve_parents(&[&direct, &archived])
            .await
            .unwrap();
        assert_eq!(outcome, ParentOutcome::Unresolved);
    }

    #[tokio::test]
    async fn single_parent_is_a_move() {
        let store = MemoryStore::new();
        store.add_collection("/seq/illumina/runs/12/12345");
        let (direct, archived) = candidates();
        let outcome = MultiplicityResolver::new(Arc::new(store))
            .resolve_parents(&[&direct, &archived])
            .await
            .unwrap();
        assert_eq!(outcome, ParentOutcome::Move(archived));
    }

    #[tokio::test]
    async fn both_parents_are_ambiguous_in_either_order() {
        let store = MemoryStore::new();
        store.add_collection("/seq/12345");
        store.add_collection("/seq/illumina/runs/12/12345");
        let (direct, archived) = candidates();
        let outcome = MultiplicityResolver::new(Arc::new(store))
            .resolve_parents(&[&direct, &archived])
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ParentOutcome::Ambiguous {
                direct: "/seq/12345".to_string(),
                archived: "/seq/illumina/runs/12/12345".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn ancestor_walk_stops_on_read_failure() {
        let store = MemoryStore::new();
        store.add_collection("/seq/a");
        store.inject_failure("/seq/a/b", FailureKind::Exists);
        let resolver = MultiplicityResolver::new(Arc::new(store));

        let ancestors = vec!["/seq/a/b/c".to_string(), "/seq/a/b".to_string(), "/seq/a".to_string()];
        assert!(resolver.deepest_existing(&ancestors).await.is_err());
        assert_eq!(
            resolver.deepest_existing(&ancestors[2..]).await.unwrap(),
            Some("/seq/a".to_string())
        );
    }
}
