//! Integration tests for error types

#[cfg(test)]
mod tests {
    use lnf_errors::*;

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::Unavailable {
            message: "/seq/lostandfound missing".into(),
        };
        let err: Error = store_err.into();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.is_store_unavailable());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound {
            path: "/seq/12345/12345_1.bam".into(),
        };
        assert_eq!(err.to_string(), "not found: /seq/12345/12345_1.bam");
    }

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let store_err = StoreError::from_io_with_path(&io_err, "/seq/x");
        assert!(matches!(store_err, StoreError::NotFound { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let store_err = StoreError::from_io_with_path(&io_err, "/seq/x");
        assert!(matches!(store_err, StoreError::ReadFailed { .. }));
    }

    #[test]
    fn test_user_codes() {
        let err: Error = InventoryError::CheckpointUnreadable {
            path: "objects".into(),
            message: "permission denied".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("inventory.checkpoint_unreadable"));
        assert!(err.user_hint().is_some());

        let err: Error = ResolveError::MalformedOrphanPath {
            path: "/seq/lostandfound".into(),
            reason: "too shallow".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("resolve.malformed_orphan_path"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_root_codes() {
        let err = Error::Internal("worker panicked".into());
        assert_eq!(err.user_code(), Some("error.internal"));
        assert!(!err.is_retryable());

        let err: Error = std::io::Error::new(std::io::ErrorKind::Interrupted, "eintr").into();
        assert_eq!(err.user_code(), Some("error.io"));
        assert!(err.is_retryable());
    }
}
