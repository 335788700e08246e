//! Store namespace paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute location of a data object: the collection holding it plus its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectPath {
    pub collection: String,
    pub name: String,
}

impl ObjectPath {
    /// Build a path from a collection and an object name
    ///
    /// Trailing separators on the collection are dropped so that
    /// `/seq/12345/` and `/seq/12345` name the same collection.
    #[must_use]
    pub fn new(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            collection: normalize_collection(&collection.into()),
            name: name.into(),
        }
    }

    /// Parse a full `/collection/.../name` path
    ///
    /// Returns `None` for relative paths and paths without a final name.
    /// Whitespace is part of the name and is kept as is.
    #[must_use]
    pub fn parse(full: &str) -> Option<Self> {
        if !full.starts_with('/') {
            return None;
        }
        let (collection, name) = full.rsplit_once('/')?;
        if name.is_empty() {
            return None;
        }
        Some(Self::new(collection, name))
    }

    /// Full path of the object
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.collection == "/" {
            format!("/{}", self.name)
        } else {
            format!("{}/{}", self.collection, self.name)
        }
    }

    /// The same object name placed into another collection
    #[must_use]
    pub fn in_collection(&self, collection: &str) -> Self {
        Self::new(collection, self.name.clone())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// Non-empty segments of a collection path
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join segments under an absolute root collection
#[must_use]
pub fn join_under(root: &str, segments: &[&str]) -> String {
    let root = normalize_collection(root);
    if segments.is_empty() {
        return root;
    }
    let tail = segments.join("/");
    if root == "/" {
        format!("/{tail}")
    } else {
        format!("{root}/{tail}")
    }
}

/// Whether `path` is `root` itself or lies below it
#[must_use]
pub fn is_within(path: &str, root: &str) -> bool {
    let path = normalize_collection(path);
    let root = normalize_collection(root);
    root == "/" || path == root || path.starts_with(&format!("{root}/"))
}

fn normalize_collection(collection: &str) -> String {
    let trimmed = collection.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A data object found in the holding area whose canonical location is unknown
///
/// Orphans are created by the inventory and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrphanObject {
    location: ObjectPath,
}

impl OrphanObject {
    #[must_use]
    pub fn new(location: ObjectPath) -> Self {
        Self { location }
    }

    /// Collection in the holding area that contains the orphan
    #[must_use]
    pub fn held_path(&self) -> &str {
        &self.location.collection
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.location.name
    }

    #[must_use]
    pub fn location(&self) -> &ObjectPath {
        &self.location
    }
}

impl fmt::Display for OrphanObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.location.fmt(f)
    }
}

/// One item yielded by a collection traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEntry {
    Object(ObjectPath),
    Collection(String),
}
