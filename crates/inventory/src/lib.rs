#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Orphan enumeration for lnf
//!
//! Orphans come either from a checkpoint left by an earlier run or from a
//! single recursive traversal of the holding collection. A traversal appends
//! each orphan to the checkpoint before yielding it, so a later run can
//! resume without walking the store again.

pub mod checkpoint;

pub use checkpoint::{CheckpointWriter, Replay, COMPLETE_MARKER};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use lnf_errors::{Error, StoreError};
use lnf_events::{AppEvent, EventEmitter, EventSender, InventoryEvent};
use lnf_store::Store;
use lnf_types::{OrphanObject, StoreEntry};

/// Lazy, finite sequence of orphans
pub type OrphanStream = BoxStream<'static, Result<OrphanObject, Error>>;

/// Where an enumeration takes its orphans from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryMode {
    /// Replaying an existing checkpoint; `complete` reflects its trailer
    Replay { complete: bool },
    /// Walking the holding collection and writing a new checkpoint
    Traversal,
}

/// An enumeration that has been started
pub struct Enumeration {
    pub mode: InventoryMode,
    pub orphans: OrphanStream,
}

impl std::fmt::Debug for Enumeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumeration")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Source of orphans for one run
#[derive(Clone)]
pub struct InventorySource {
    store: Arc<dyn Store>,
    holding_collection: String,
    checkpoint: PathBuf,
    tx: Option<EventSender>,
}

impl EventEmitter for InventorySource {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl InventorySource {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        holding_collection: impl Into<String>,
        checkpoint: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            holding_collection: holding_collection.into(),
            checkpoint: checkpoint.into(),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint
    }

    /// Start enumerating orphans
    ///
    /// With a checkpoint present the store is never traversed; the listed
    /// orphans are yielded in file order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` when there is no checkpoint and the
    /// holding collection cannot be reached, and an inventory error when the
    /// checkpoint exists but cannot be read or opened for appending.
    pub async fn enumerate(&self) -> Result<Enumeration, Error> {
        if let Some(replay) = checkpoint::read(&self.checkpoint).await? {
            return Ok(self.replay(replay));
        }
        self.traverse().await
    }

    fn replay(&self, replay: Replay) -> Enumeration {
        let entries = replay.entries.len();
        self.emit(AppEvent::Inventory(InventoryEvent::CheckpointReplayed {
            checkpoint: self.checkpoint.clone(),
            entries,
        }));
        if !replay.complete {
            self.emit(AppEvent::Inventory(InventoryEvent::CheckpointIncomplete {
                checkpoint: self.checkpoint.clone(),
                entries,
            }));
        }
        self.emit(AppEvent::Inventory(InventoryEvent::Finished {
            orphans: entries,
            replayed: true,
        }));

        let orphans = stream::iter(replay.entries.into_iter().map(|entry| Ok(OrphanObject::new(entry))));
        Enumeration {
            mode: InventoryMode::Replay {
                complete: replay.complete,
            },
            orphans: orphans.boxed(),
        }
    }

    async fn traverse(&self) -> Result<Enumeration, Error> {
        let reachable = self
            .store
            .collection_exists(&self.holding_collection)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("{}: {e}", self.holding_collection),
            })?;
        if !reachable {
            return Err(StoreError::Unavailable {
                message: format!(
                    "holding collection {} does not exist and no checkpoint was found",
                    self.holding_collection
                ),
            }
            .into());
        }

        let writer = CheckpointWriter::open(&self.checkpoint).await?;
        self.emit(AppEvent::Inventory(InventoryEvent::TraversalStarted {
            collection: self.holding_collection.clone(),
            checkpoint: self.checkpoint.clone(),
        }));

        let state = Traversal {
            entries: self.store.iter_contents(&self.holding_collection, true),
            writer: Some(writer),
            source: self.clone(),
            seen: 0,
        };
        let orphans = stream::unfold(Some(state), |state| async move {
            let mut state = state?;
            state.next_orphan().await.map(|(item, done)| {
                let next = if done { None } else { Some(state) };
                (item, next)
            })
        });

        Ok(Enumeration {
            mode: InventoryMode::Traversal,
            orphans: orphans.boxed(),
        })
    }
}

struct Traversal {
    entries: BoxStream<'static, Result<StoreEntry, Error>>,
    writer: Option<CheckpointWriter>,
    source: InventorySource,
    seen: usize,
}

impl Traversal {
    /// Next item plus whether the stream must end after it
    async fn next_orphan(&mut self) -> Option<(Result<OrphanObject, Error>, bool)> {
        loop {
            match self.entries.next().await {
                Some(Ok(StoreEntry::Object(path))) => {
                    let writer = self.writer.as_mut()?;
                    if let Err(e) = writer.append(&path).await {
                        return Some((Err(e), true));
                    }
                    self.seen += 1;
                    self.source
                        .emit(AppEvent::Inventory(InventoryEvent::OrphanDiscovered {
                            path: path.full_path(),
                        }));
                    return Some((Ok(OrphanObject::new(path)), false));
                }
                Some(Ok(StoreEntry::Collection(_))) => {}
                // The checkpoint stays without its trailer, so the next
                // run replays what was listed and warns about it.
                Some(Err(e)) => return Some((Err(e), true)),
                None => {
                    let writer = self.writer.take()?;
                    if let Err(e) = writer.complete().await {
                        return Some((Err(e), true));
                    }
                    self.source
                        .emit(AppEvent::Inventory(InventoryEvent::Finished {
                            orphans: self.seen,
                            replayed: false,
                        }));
                    return None;
                }
            }
        }
    }
}
