//! Integration tests for orphan enumeration

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::TryStreamExt;
    use lnf_errors::{Error, InventoryError, StoreError};
    use lnf_events::{channel, AppEvent, InventoryEvent};
    use lnf_inventory::{InventoryMode, InventorySource, COMPLETE_MARKER};
    use lnf_store::{FailureKind, MemoryStore};
    use lnf_types::{ObjectPath, OrphanObject};
    use tempfile::TempDir;

    const HOLDING: &str = "/seq/lostandfound";

    fn held_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_object(&ObjectPath::new("/seq/lostandfound/b1", "a.cram"), b"a");
        store.add_object(&ObjectPath::new("/seq/lostandfound/b1/x", "b.cram"), b"b");
        store.add_object(&ObjectPath::new("/seq/12345", "12345_1.bam"), b"c");
        store
    }

    fn names(orphans: &[OrphanObject]) -> Vec<String> {
        orphans.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_fresh_traversal_writes_checkpoint() {
        let temp = TempDir::new().unwrap();
        let checkpoint = temp.path().join("objects");
        let store = held_store();
        let source = InventorySource::new(Arc::new(store.clone()), HOLDING, &checkpoint);

        let enumeration = source.enumerate().await.unwrap();
        assert_eq!(enumeration.mode, InventoryMode::Traversal);
        let orphans: Vec<OrphanObject> = enumeration.orphans.try_collect().await.unwrap();

        assert_eq!(
            names(&orphans),
            vec![
                "/seq/lostandfound/b1/a.cram",
                "/seq/lostandfound/b1/x/b.cram"
            ]
        );
        let contents = tokio::fs::read_to_string(&checkpoint).await.unwrap();
        assert_eq!(
            contents,
            format!("/seq/lostandfound/b1/a.cram\n/seq/lostandfound/b1/x/b.cram\n{COMPLETE_MARKER}\n")
        );
        assert_eq!(store.traversal_count(), 1);
    }

    #[tokio::test]
    async fn test_checkpoint_replay_ignores_live_state() {
        let temp = TempDir::new().unwrap();
        let checkpoint = temp.path().join("objects");
        tokio::fs::write(
            &checkpoint,
            format!("/seq/lostandfound/z/B\n/seq/lostandfound/z/A\n{COMPLETE_MARKER}\n"),
        )
        .await
        .unwrap();
        let store = held_store();
        let source = InventorySource::new(Arc::new(store.clone()), HOLDING, &checkpoint);

        let enumeration = source.enumerate().await.unwrap();
        assert_eq!(enumeration.mode, InventoryMode::Replay { complete: true });
        let orphans: Vec<OrphanObject> = enumeration.orphans.try_collect().await.unwrap();

        assert_eq!(
            names(&orphans),
            vec!["/seq/lostandfound/z/B", "/seq/lostandfound/z/A"]
        );
        assert_eq!(store.traversal_count(), 0);
    }

    #[tokio::test]
    async fn test_replay_without_trailer_warns() {
        let temp = TempDir::new().unwrap();
        let checkpoint = temp.path().join("objects");
        tokio::fs::write(&checkpoint, "/seq/lostandfound/b1/a.cram\n")
            .await
            .unwrap();
        let (tx, mut rx) = channel();
        let source = InventorySource::new(Arc::new(MemoryStore::new()), HOLDING, &checkpoint)
            .with_event_sender(tx);

        let enumeration = source.enumerate().await.unwrap();
        assert_eq!(enumeration.mode, InventoryMode::Replay { complete: false });
        let orphans: Vec<OrphanObject> = enumeration.orphans.try_collect().await.unwrap();
        assert_eq!(orphans.len(), 1);

        let mut warned = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Inventory(InventoryEvent::CheckpointIncomplete { entries, .. }) =
                message.event
            {
                assert_eq!(entries, 1);
                warned = true;
            }
        }
        assert!(warned);
    }

    #[tokio::test]
    async fn test_missing_holding_collection_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let source = InventorySource::new(
            Arc::new(MemoryStore::new()),
            HOLDING,
            temp.path().join("objects"),
        );

        let err = source.enumerate().await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(!temp.path().join("objects").exists());
    }

    #[tokio::test]
    async fn test_unreadable_holding_collection_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let store = held_store();
        store.inject_failure(HOLDING, FailureKind::Exists);
        let source = InventorySource::new(Arc::new(store), HOLDING, temp.path().join("objects"));

        let err = source.enumerate().await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_interrupted_traversal_leaves_resumable_checkpoint() {
        let temp = TempDir::new().unwrap();
        let checkpoint = temp.path().join("objects");
        let store = held_store();
        let source = InventorySource::new(Arc::new(store.clone()), HOLDING, &checkpoint);

        let mut orphans = source.enumerate().await.unwrap().orphans;
        let first = orphans.try_next().await.unwrap().unwrap();
        drop(orphans);

        let contents = tokio::fs::read_to_string(&checkpoint).await.unwrap();
        assert_eq!(contents, format!("{first}\n"));

        let resumed = source.enumerate().await.unwrap();
        assert_eq!(resumed.mode, InventoryMode::Replay { complete: false });
        let replayed: Vec<OrphanObject> = resumed.orphans.try_collect().await.unwrap();
        assert_eq!(replayed, vec![first]);
        assert_eq!(store.traversal_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_checkpoint_is_rejected() {
        let temp = TempDir::new().unwrap();
        let checkpoint = temp.path().join("objects");
        tokio::fs::write(&checkpoint, "not-a-path\n").await.unwrap();
        let source = InventorySource::new(Arc::new(held_store()), HOLDING, &checkpoint);

        let err = source.enumerate().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Inventory(InventoryError::MalformedEntry { line: 1, .. })
        ));
    }
}
