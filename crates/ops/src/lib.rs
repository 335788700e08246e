#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for lnf
//!
//! This crate sits between the CLI and the specialised crates. The full
//! resolve run lives in `large_ops`; enumeration, single-orphan explain and
//! classification are small operations.

mod context;
mod large_ops;
mod small_ops;
mod types;

pub use context::{open_local_store, OpsContextBuilder, OpsCtx};
pub use types::{
    ClassifyReport, ExplainReport, InventoryOrigin, InventoryReport, RunSummary,
};

// Re-export operation functions
pub use large_ops::resolve;
pub use small_ops::{classify, explain, inventory};

use lnf_errors::Error;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Summary of a full resolve run
    RunSummary(RunSummary),
    /// Orphan enumeration
    Inventory(InventoryReport),
    /// Decision for a single orphan
    Explain(ExplainReport),
    /// Technology label for a held path
    Classification(ClassifyReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            lnf_errors::OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }
}
