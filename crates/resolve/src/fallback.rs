//! Store-wide checksum search used when no structural candidate exists

use std::sync::Arc;

use lnf_errors::Error;
use lnf_store::Store;
use lnf_types::path::is_within;
use lnf_types::{ObjectPath, StoreEntry};

use crate::subject::Subject;

/// Result of a content search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// First object with the orphan's name and a recomputed equal checksum
    pub matched: Option<ObjectPath>,
    /// Objects returned by the query that were rejected
    pub rejected: usize,
}

#[derive(Clone)]
pub struct ContentFallbackSearch {
    store: Arc<dyn Store>,
    checksum_key: String,
    scope: String,
    holding_collection: String,
}

impl ContentFallbackSearch {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        checksum_key: impl Into<String>,
        scope: impl Into<String>,
        holding_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            checksum_key: checksum_key.into(),
            scope: scope.into(),
            holding_collection: holding_collection.into(),
        }
    }

    /// Look for a same-named object whose content checksum equals the orphan's
    ///
    /// Annotation hits are not trusted on their own: each one is checked by
    /// name and by a fresh checksum read. Hits inside the holding collection
    /// are other orphans (or the orphan itself) and never count.
    ///
    /// # Errors
    ///
    /// Returns an error when the orphan's checksum or the query cannot be
    /// read. Checksum failures on individual hits only reject that hit.
    pub async fn search(&self, subject: &Subject) -> Result<SearchOutcome, Error> {
        let checksum = subject.checksum().await?;
        let hits = self
            .store
            .query_by_metadata(&self.checksum_key, &checksum.to_hex(), &self.scope, true)
            .await?;

        let mut rejected = 0;
        for hit in hits {
            let StoreEntry::Object(candidate) = hit else {
                continue;
            };
            if candidate.name != subject.orphan().name()
                || is_within(&candidate.collection, &self.holding_collection)
            {
                rejected += 1;
                continue;
            }
            match self.store.checksum(&candidate).await {
                Ok(current) if current == checksum => {
                    return Ok(SearchOutcome {
                        matched: Some(candidate),
                        rejected,
                    });
                }
                _ => rejected += 1,
            }
        }

        Ok(SearchOutcome {
            matched: None,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnf_hash::Checksum;
    use lnf_store::{FailureKind, MemoryStore};
    use lnf_types::{Avu, OrphanObject};

    const NAME: &str = "12345_1.bam";

    fn setup() -> (MemoryStore, Subject, String) {
        let store = MemoryStore::new();
        let held = ObjectPath::new("/seq/lostandfound/x/y", NAME);
        store.add_object(&held, b"reads");
        let md5 = Checksum::from_data(b"reads").to_hex();
        store.annotate(&held.full_path(), Avu::new("md5", md5.clone())).unwrap();
        let subject = Subject::new(OrphanObject::new(held), Arc::new(store.clone()));
        (store, subject, md5)
    }

    fn search(store: &MemoryStore) -> ContentFallbackSearch {
        ContentFallbackSearch::new(Arc::new(store.clone()), "md5", "/seq", "/seq/lostandfound")
    }

    #[tokio::test]
    async fn orphan_never_matches_itself() {
        let (store, subject, _) = setup();
        let outcome = search(&store).search(&subject).await.unwrap();
        assert_eq!(outcome.matched, None);
        assert_eq!(outcome.rejected, 1);
    }

    #[tokio::test]
    async fn same_name_and_content_elsewhere_matches() {
        let (store, subject, md5) = setup();
        let elsewhere = ObjectPath::new("/seq/archive/2019", NAME);
        store.add_object(&elsewhere, b"reads");
        store.annotate(&elsewhere.full_path(), Avu::new("md5", md5)).unwrap();

        let outcome = search(&store).search(&subject).await.unwrap();
        assert_eq!(outcome.matched, Some(elsewhere));
    }

    #[tokio::test]
    async fn different_name_is_rejected() {
        let (store, subject, md5) = setup();
        let renamed = ObjectPath::new("/seq/archive/2019", "renamed.bam");
        store.add_object(&renamed, b"reads");
        store.annotate(&renamed.full_path(), Avu::new("md5", md5)).unwrap();

        let outcome = search(&store).search(&subject).await.unwrap();
        assert_eq!(outcome.matched, None);
    }

    #[tokio::test]
    async fn stale_annotation_is_rejected() {
        let (store, subject, md5) = setup();
        let stale = ObjectPath::new("/seq/archive/2019", NAME);
        store.add_object(&stale, b"rewritten");
        store.annotate(&stale.full_path(), Avu::new("md5", md5)).unwrap();

        let outcome = search(&store).search(&subject).await.unwrap();
        assert_eq!(outcome.matched, None);
    }

    #[tokio::test]
    async fn unreadable_hit_is_skipped() {
        let (store, subject, md5) = setup();
        let broken = ObjectPath::new("/seq/a", NAME);
        let good = ObjectPath::new("/seq/b", NAME);
        for path in [&broken, &good] {
            store.add_object(path, b"reads");
            store.annotate(&path.full_path(), Avu::new("md5", md5.clone())).unwrap();
        }
        store.inject_failure(&broken.full_path(), FailureKind::Checksum);

        let outcome = search(&store).search(&subject).await.unwrap();
        assert_eq!(outcome.matched, Some(good));
    }
}
