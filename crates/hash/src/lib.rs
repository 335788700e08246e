#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! MD5 content checksums for lnf
//!
//! The store annotates every object with the MD5 of its content under the
//! `md5` metadata key, so identity checks compare values of this type.

use lnf_errors::{Error, StoreError};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// An MD5 digest of object content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum {
    bytes: [u8; 16],
}

impl Checksum {
    /// Create a checksum from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Convert to lowercase hex, the form stored in metadata
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or is not exactly 32 characters (16 bytes).
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|e| StoreError::CorruptedMetadata {
            path: String::new(),
            message: format!("invalid hex checksum: {e}"),
        })?;

        if bytes.len() != 16 {
            return Err(StoreError::CorruptedMetadata {
                path: String::new(),
                message: format!("checksum must be 16 bytes, got {}", bytes.len()),
            }
            .into());
        }

        let mut array = [0u8; 16];
        array.copy_from_slice(&bytes);
        Ok(Self::from_bytes(array))
    }

    /// Compute the checksum of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_digest(&Md5::digest(data))
    }

    /// Compute the checksum of a file, streaming its content
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        let display = path.display().to_string();
        let mut file = File::open(path)
            .await
            .map_err(|e| StoreError::from_io_with_path(&e, &display))?;

        let mut hasher = Md5::new();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| StoreError::from_io_with_path(&e, &display))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(Self::from_digest(&hasher.finalize()))
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(digest);
        Self::from_bytes(bytes)
    }

    /// Whether a metadata value records this checksum
    #[must_use]
    pub fn matches_hex(&self, value: &str) -> bool {
        Self::from_hex(value).is_ok_and(|other| other == *self)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Checksum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
