//! Directory-backed store

use std::path::{Path, PathBuf};

use futures::stream::{self, BoxStream, StreamExt};
use lnf_errors::{Error, StoreError};
use lnf_hash::Checksum;
use lnf_types::path::segments;
use lnf_types::{MetadataSet, ObjectPath, StoreEntry};
use tokio::fs;
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::Store;

/// Name of the shadow directory holding annotations, relative to the root
pub const METADATA_DIR: &str = ".lnf-meta";

const TRAVERSAL_BUFFER: usize = 256;

/// Zone mirrored onto a local directory
///
/// Collections are directories and objects are regular files. The
/// annotations of `/a/b/c` live in `<root>/.lnf-meta/a/b/c.json` as a JSON
/// array of `{attribute, value, units}` triples.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Open a store rooted at an existing directory
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if `root` is not a readable directory.
    pub async fn open<P: Into<PathBuf>>(root: P) -> Result<Self, Error> {
        let root = root.into();
        match fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => Ok(Self::new(root)),
            Ok(_) => Err(StoreError::Unavailable {
                message: format!("{} is not a directory", root.display()),
            }
            .into()),
            Err(e) => Err(StoreError::Unavailable {
                message: format!("{}: {e}", root.display()),
            }
            .into()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the annotations stored for an object or collection
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the shadow file cannot be written.
    pub async fn write_metadata(&self, path: &str, metadata: &MetadataSet) -> Result<(), Error> {
        let target = self.metadata_file(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        let json = serde_json::to_vec_pretty(metadata)?;
        fs::write(&target, json)
            .await
            .map_err(|e| Error::io_with_path(&e, &target))?;
        Ok(())
    }

    fn data_path(&self, path: &str) -> Result<PathBuf, Error> {
        map_into(&self.root, path)
    }

    fn metadata_file(&self, path: &str) -> Result<PathBuf, Error> {
        if segments(path).is_empty() {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
            }
            .into());
        }
        let mut file = map_into(&self.root.join(METADATA_DIR), path)?;
        let mut name = file.file_name().unwrap_or_default().to_os_string();
        name.push(".json");
        file.set_file_name(name);
        Ok(file)
    }

    async fn probe(&self, path: &str) -> Result<Option<std::fs::Metadata>, Error> {
        let local = self.data_path(path)?;
        match fs::metadata(&local).await {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(StoreError::from_io_with_path(&e, path).into()),
        }
    }
}

#[async_trait::async_trait]
impl Store for LocalStore {
    async fn collection_exists(&self, path: &str) -> Result<bool, Error> {
        Ok(self.probe(path).await?.is_some_and(|m| m.is_dir()))
    }

    async fn object_exists(&self, path: &ObjectPath) -> Result<bool, Error> {
        Ok(self
            .probe(&path.full_path())
            .await?
            .is_some_and(|m| m.is_file()))
    }

    async fn checksum(&self, path: &ObjectPath) -> Result<Checksum, Error> {
        let full = path.full_path();
        let local = self.data_path(&full)?;
        Checksum::hash_file(&local).await.map_err(|e| match e {
            Error::Store(_) => e,
            other => StoreError::ReadFailed {
                path: full,
                message: other.to_string(),
            }
            .into(),
        })
    }

    async fn metadata(&self, path: &ObjectPath) -> Result<MetadataSet, Error> {
        let full = path.full_path();
        let file = self.metadata_file(&full)?;
        match fs::read(&file).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::CorruptedMetadata {
                    path: full,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if is_absent(&e) => Ok(MetadataSet::default()),
            Err(e) => Err(StoreError::from_io_with_path(&e, &full).into()),
        }
    }

    async fn query_by_metadata(
        &self,
        key: &str,
        value: &str,
        scope: &str,
        objects_only: bool,
    ) -> Result<Vec<StoreEntry>, Error> {
        let meta_root = self.root.join(METADATA_DIR);
        let scope_dir = map_into(&meta_root, scope)?;
        let data_root = self.root.clone();
        let (key, value) = (key.to_string(), value.to_string());
        let query_failed = {
            let (key, value) = (key.clone(), value.clone());
            move |message: String| StoreError::QueryFailed {
                key,
                value,
                message,
            }
        };

        let search = tokio::task::spawn_blocking(move || {
            let mut hits = Vec::new();
            if !scope_dir.is_dir() {
                return Ok(hits);
            }
            for entry in WalkDir::new(&scope_dir).sort_by_file_name() {
                let entry = entry.map_err(|e| e.to_string())?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(zone_path) = zone_path_of_metadata(&meta_root, entry.path()) else {
                    continue;
                };
                let bytes = std::fs::read(entry.path()).map_err(|e| e.to_string())?;
                // Unparseable shadow files cannot match anything.
                let Ok(metadata) = serde_json::from_slice::<MetadataSet>(&bytes) else {
                    continue;
                };
                if !metadata.contains(&key, &value) {
                    continue;
                }
                let Ok(local) = map_into(&data_root, &zone_path) else {
                    continue;
                };
                if local.is_file() {
                    if let Some(object) = ObjectPath::parse(&zone_path) {
                        hits.push(StoreEntry::Object(object));
                    }
                } else if local.is_dir() && !objects_only {
                    hits.push(StoreEntry::Collection(zone_path));
                }
            }
            Ok::<_, String>(hits)
        });

        match search.await {
            Ok(Ok(hits)) => Ok(hits),
            Ok(Err(message)) => Err(query_failed(message).into()),
            Err(e) => Err(query_failed(e.to_string()).into()),
        }
    }

    fn iter_contents(
        &self,
        collection: &str,
        recursive: bool,
    ) -> BoxStream<'static, Result<StoreEntry, Error>> {
        let base = match self.data_path(collection) {
            Ok(base) => base,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };
        let zone_base = lnf_types::path::join_under(collection, &[]);
        let (tx, rx) = mpsc::channel::<Result<StoreEntry, Error>>(TRAVERSAL_BUFFER);

        tokio::task::spawn_blocking(move || {
            if !base.is_dir() {
                let _ = tx.blocking_send(Err(StoreError::NotFound { path: zone_base }.into()));
                return;
            }
            let walker = WalkDir::new(&base)
                .min_depth(1)
                .max_depth(if recursive { usize::MAX } else { 1 })
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.file_name() != METADATA_DIR);
            for entry in walker {
                let item = match entry {
                    Ok(entry) => match entry_for(&zone_base, &base, &entry) {
                        Some(found) => Ok(found),
                        None => continue,
                    },
                    Err(e) => Err(StoreError::ReadFailed {
                        path: zone_base.clone(),
                        message: e.to_string(),
                    }
                    .into()),
                };
                // Consumer dropped the stream.
                if tx.blocking_send(item).is_err() {
                    return;
                }
            }
        });

        stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed()
    }
}

fn is_absent(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

/// Map an absolute zone path below `base`, refusing anything that escapes it
fn map_into(base: &Path, path: &str) -> Result<PathBuf, Error> {
    if !path.starts_with('/') {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
        }
        .into());
    }
    let mut local = base.to_path_buf();
    for segment in segments(path) {
        if segment == "." || segment == ".." || segment == METADATA_DIR {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
            }
            .into());
        }
        local.push(segment);
    }
    Ok(local)
}

fn zone_path_of_metadata(meta_root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(meta_root).ok()?;
    let mut parts = relative
        .components()
        .map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    let last = parts.pop()?;
    parts.push(last.strip_suffix(".json")?.to_string());
    Some(format!("/{}", parts.join("/")))
}

fn entry_for(zone_base: &str, base: &Path, entry: &walkdir::DirEntry) -> Option<StoreEntry> {
    let relative = entry.path().strip_prefix(base).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    let zone_path = lnf_types::path::join_under(zone_base, &parts);
    if entry.file_type().is_dir() {
        Some(StoreEntry::Collection(zone_path))
    } else if entry.file_type().is_file() {
        ObjectPath::parse(&zone_path).map(StoreEntry::Object)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_into_rejects_escapes() {
        let base = Path::new("/tmp/zone");
        assert!(map_into(base, "/seq/../etc").is_err());
        assert!(map_into(base, "relative/path").is_err());
        assert!(map_into(base, "/seq/.lnf-meta/x").is_err());
        assert_eq!(
            map_into(base, "/seq/100_A").unwrap(),
            Path::new("/tmp/zone/seq/100_A")
        );
    }

    #[test]
    fn metadata_file_names_round_trip() {
        let meta_root = Path::new("/tmp/zone/.lnf-meta");
        let file = meta_root.join("seq/100_A/100_A_1.cram.json");
        assert_eq!(
            zone_path_of_metadata(meta_root, &file).as_deref(),
            Some("/seq/100_A/100_A_1.cram")
        );
    }
}
