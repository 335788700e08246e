//! In-memory store used by tests and dry runs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use futures::stream::{self, BoxStream, StreamExt};
use lnf_errors::{Error, StoreError};
use lnf_hash::Checksum;
use lnf_types::path::{is_within, segments};
use lnf_types::{Avu, MetadataSet, ObjectPath, StoreEntry};

use crate::Store;

/// Store operation that can be made to fail for a given path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Exists,
    Checksum,
    Metadata,
    Query,
    Traversal,
}

#[derive(Debug, Clone)]
struct StoredObject {
    checksum: Checksum,
    metadata: MetadataSet,
}

#[derive(Debug, Default)]
struct Inner {
    collections: DashMap<String, MetadataSet>,
    objects: DashMap<ObjectPath, StoredObject>,
    failures: DashSet<(String, FailureKind)>,
    traversals: AtomicUsize,
}

/// Zone held entirely in memory
///
/// Cloning is cheap and clones share state. Adding an object or collection
/// creates all of its ancestor collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collection(&self, path: &str) {
        let parts = segments(path);
        for depth in 0..=parts.len() {
            let collection = lnf_types::path::join_under("/", &parts[..depth]);
            self.inner.collections.entry(collection).or_default();
        }
    }

    /// Add an object whose checksum is the MD5 of `content`
    pub fn add_object(&self, path: &ObjectPath, content: &[u8]) {
        self.add_object_with_checksum(path, Checksum::from_data(content));
    }

    pub fn add_object_with_checksum(&self, path: &ObjectPath, checksum: Checksum) {
        self.add_collection(&path.collection);
        self.inner.objects.insert(
            path.clone(),
            StoredObject {
                checksum,
                metadata: MetadataSet::default(),
            },
        );
    }

    /// Attach an annotation to an existing object or collection
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if nothing lives at `path`.
    pub fn annotate(&self, path: &str, avu: Avu) -> Result<(), Error> {
        if let Some(object) = ObjectPath::parse(path) {
            if let Some(mut stored) = self.inner.objects.get_mut(&object) {
                stored.metadata = stored.metadata.iter().cloned().chain([avu]).collect();
                return Ok(());
            }
        }
        let collection = lnf_types::path::join_under(path, &[]);
        if let Some(mut metadata) = self.inner.collections.get_mut(&collection) {
            *metadata = metadata.iter().cloned().chain([avu]).collect();
            return Ok(());
        }
        Err(StoreError::NotFound {
            path: path.to_string(),
        }
        .into())
    }

    /// Make every later `kind` operation on `path` fail with a read error
    pub fn inject_failure(&self, path: &str, kind: FailureKind) {
        self.inner.failures.insert((path.to_string(), kind));
    }

    /// Number of traversals started so far
    #[must_use]
    pub fn traversal_count(&self) -> usize {
        self.inner.traversals.load(Ordering::SeqCst)
    }

    fn check(&self, path: &str, kind: FailureKind) -> Result<(), Error> {
        if self.inner.failures.contains(&(path.to_string(), kind)) {
            return Err(StoreError::ReadFailed {
                path: path.to_string(),
                message: format!("injected {kind:?} failure"),
            }
            .into());
        }
        Ok(())
    }

    fn object(&self, path: &ObjectPath) -> Result<StoredObject, Error> {
        self.inner
            .objects
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                StoreError::NotFound {
                    path: path.full_path(),
                }
                .into()
            })
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn collection_exists(&self, path: &str) -> Result<bool, Error> {
        self.check(path, FailureKind::Exists)?;
        let collection = lnf_types::path::join_under(path, &[]);
        Ok(self.inner.collections.contains_key(&collection))
    }

    async fn object_exists(&self, path: &ObjectPath) -> Result<bool, Error> {
        self.check(&path.full_path(), FailureKind::Exists)?;
        Ok(self.inner.objects.contains_key(path))
    }

    async fn checksum(&self, path: &ObjectPath) -> Result<Checksum, Error> {
        self.check(&path.full_path(), FailureKind::Checksum)?;
        Ok(self.object(path)?.checksum)
    }

    async fn metadata(&self, path: &ObjectPath) -> Result<MetadataSet, Error> {
        self.check(&path.full_path(), FailureKind::Metadata)?;
        Ok(self.object(path)?.metadata)
    }

    async fn query_by_metadata(
        &self,
        key: &str,
        value: &str,
        scope: &str,
        objects_only: bool,
    ) -> Result<Vec<StoreEntry>, Error> {
        if self.check(scope, FailureKind::Query).is_err() {
            return Err(StoreError::QueryFailed {
                key: key.to_string(),
                value: value.to_string(),
                message: "injected query failure".to_string(),
            }
            .into());
        }

        let mut objects: Vec<ObjectPath> = self
            .inner
            .objects
            .iter()
            .filter(|entry| {
                is_within(&entry.key().collection, scope) && entry.value().metadata.contains(key, value)
            })
            .map(|entry| entry.key().clone())
            .collect();
        objects.sort();

        let mut hits: Vec<StoreEntry> = objects.into_iter().map(StoreEntry::Object).collect();
        if !objects_only {
            let mut collections: Vec<String> = self
                .inner
                .collections
                .iter()
                .filter(|entry| is_within(entry.key(), scope) && entry.value().contains(key, value))
                .map(|entry| entry.key().clone())
                .collect();
            collections.sort();
            hits.extend(collections.into_iter().map(StoreEntry::Collection));
        }
        Ok(hits)
    }

    fn iter_contents(
        &self,
        collection: &str,
        recursive: bool,
    ) -> BoxStream<'static, Result<StoreEntry, Error>> {
        self.inner.traversals.fetch_add(1, Ordering::SeqCst);
        let base = lnf_types::path::join_under(collection, &[]);

        if let Err(e) = self.check(&base, FailureKind::Traversal) {
            return stream::once(async move { Err(e) }).boxed();
        }
        if !self.inner.collections.contains_key(&base) {
            return stream::once(async move { Err(StoreError::NotFound { path: base }.into()) })
                .boxed();
        }

        let depth = segments(&base).len();
        let below = |path: &str| {
            path != base
                && is_within(path, &base)
                && (recursive || segments(path).len() == depth + 1)
        };

        let mut entries: Vec<(String, StoreEntry)> = self
            .inner
            .collections
            .iter()
            .filter(|entry| below(entry.key()))
            .map(|entry| (entry.key().clone(), StoreEntry::Collection(entry.key().clone())))
            .collect();
        entries.extend(
            self.inner
                .objects
                .iter()
                .filter(|entry| {
                    let collection = &entry.key().collection;
                    collection == &base || (recursive && below(collection))
                })
                .map(|entry| (entry.key().full_path(), StoreEntry::Object(entry.key().clone()))),
        );
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        stream::iter(entries.into_iter().map(|(_, entry)| Ok(entry))).boxed()
    }
}
