//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use lnf_hash::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_hash_file_matches_content() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("12345_1.bam");

        let data = b"verify this content";
        fs::write(&file_path, data).await.unwrap();

        let checksum = Checksum::hash_file(&file_path).await.unwrap();
        assert_eq!(checksum, Checksum::from_data(data));
        assert_ne!(checksum, Checksum::from_data(b"different content"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = Checksum::hash_file(&dir.path().join("absent")).await.unwrap_err();
        assert_eq!(
            lnf_errors::UserFacingError::user_code(&err),
            Some("store.not_found")
        );
    }

    #[test]
    fn test_checksum_from_hex_errors() {
        // Too short
        assert!(Checksum::from_hex("1234").is_err());

        // Too long
        assert!(Checksum::from_hex(&"a".repeat(34)).is_err());

        // Invalid hex
        assert!(Checksum::from_hex("xyz123").is_err());
    }
}
