//! Content identity checks between an orphan and an existing object

use std::sync::Arc;

use lnf_errors::Error;
use lnf_store::Store;
use lnf_types::{CanonicalCandidate, Decision, Evidence};

use crate::subject::Subject;

/// The only stage allowed to decide `Remove` for a structural hit
#[derive(Clone)]
pub struct IdentityVerifier {
    store: Arc<dyn Store>,
    checksum_key: String,
}

impl IdentityVerifier {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, checksum_key: impl Into<String>) -> Self {
        Self {
            store,
            checksum_key: checksum_key.into(),
        }
    }

    /// Compare the orphan with the object found at `existing`
    ///
    /// Equal checksums are not enough to remove: the existing copy must also
    /// carry a checksum annotation holding that same value.
    ///
    /// # Errors
    ///
    /// Returns the store error when either checksum or the existing object's
    /// metadata cannot be read. No decision is made in that case.
    pub async fn verify(
        &self,
        subject: &Subject,
        existing: &CanonicalCandidate,
    ) -> Result<Decision, Error> {
        let orphan = subject.orphan().location().clone();
        let held = subject.checksum().await?;
        let current = self.store.checksum(&existing.path).await?;

        if held != current {
            return Ok(Decision::KeepChecksumMismatch {
                orphan,
                existing: existing.path.clone(),
            });
        }

        let annotations = self.store.metadata(&existing.path).await?;
        let recorded = annotations
            .values_of(&self.checksum_key)
            .any(|value| current.matches_hex(value));
        if recorded {
            Ok(Decision::Remove {
                orphan,
                existing: existing.path.clone(),
                evidence: Evidence::Structural(existing.origin),
            })
        } else {
            Ok(Decision::KeepMetadataMissing {
                orphan,
                existing: existing.path.clone(),
            })
        }
    }
}
