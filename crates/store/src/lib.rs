#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Object-and-metadata store access for lnf
//!
//! The resolver only ever talks to a [`Store`]. Two backends ship with the
//! crate: [`LocalStore`] maps the zone onto a directory tree and
//! [`MemoryStore`] keeps everything in memory for tests and dry runs.

mod local;
mod memory;

pub use local::{LocalStore, METADATA_DIR};
pub use memory::{FailureKind, MemoryStore};

use futures::stream::BoxStream;
use lnf_errors::Error;
use lnf_hash::Checksum;
use lnf_types::{MetadataSet, ObjectPath, StoreEntry};

/// Read-only capabilities the resolver needs from the store
///
/// Existence checks must be consistent with later reads in the same run.
/// Nothing here mutates the store.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn collection_exists(&self, path: &str) -> Result<bool, Error>;

    async fn object_exists(&self, path: &ObjectPath) -> Result<bool, Error>;

    /// Content checksum of an object
    async fn checksum(&self, path: &ObjectPath) -> Result<Checksum, Error>;

    /// Annotations on an object; an object without any yields an empty set
    async fn metadata(&self, path: &ObjectPath) -> Result<MetadataSet, Error>;

    /// Indexed search for entries annotated `key = value` under `scope`
    async fn query_by_metadata(
        &self,
        key: &str,
        value: &str,
        scope: &str,
        objects_only: bool,
    ) -> Result<Vec<StoreEntry>, Error>;

    /// Lazily list what a collection holds
    ///
    /// A missing collection yields a single `NotFound` error.
    fn iter_contents(
        &self,
        collection: &str,
        recursive: bool,
    ) -> BoxStream<'static, Result<StoreEntry, Error>>;
}
