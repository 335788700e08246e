//! Orphan under resolution with lazily fetched store facts

use std::sync::Arc;

use lnf_errors::Error;
use lnf_hash::Checksum;
use lnf_store::Store;
use lnf_types::{MetadataSet, OrphanObject};
use tokio::sync::OnceCell;

/// Wraps an orphan so its checksum and metadata are read at most once
///
/// A failed read is remembered as well; stages that need the value see the
/// same error instead of hitting the store again.
pub struct Subject {
    orphan: OrphanObject,
    store: Arc<dyn Store>,
    checksum: OnceCell<Result<Checksum, Error>>,
    metadata: OnceCell<Result<MetadataSet, Error>>,
}

impl Subject {
    #[must_use]
    pub fn new(orphan: OrphanObject, store: Arc<dyn Store>) -> Self {
        Self {
            orphan,
            store,
            checksum: OnceCell::new(),
            metadata: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn orphan(&self) -> &OrphanObject {
        &self.orphan
    }

    /// Held path and name joined, used to tag events
    #[must_use]
    pub fn label(&self) -> String {
        self.orphan.to_string()
    }

    /// # Errors
    ///
    /// Returns the store error from the first attempt to read the checksum.
    pub async fn checksum(&self) -> Result<Checksum, Error> {
        self.checksum
            .get_or_init(|| self.store.checksum(self.orphan.location()))
            .await
            .clone()
    }

    /// # Errors
    ///
    /// Returns the store error from the first attempt to read the metadata.
    pub async fn metadata(&self) -> Result<MetadataSet, Error> {
        self.metadata
            .get_or_init(|| self.store.metadata(self.orphan.location()))
            .await
            .clone()
    }
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("orphan", &self.orphan)
            .field("checksum", &self.checksum.get())
            .finish_non_exhaustive()
    }
}
