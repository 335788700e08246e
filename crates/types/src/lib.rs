#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the lnf orphan reconciler
//!
//! This crate provides the data model shared by every other crate: object
//! paths, orphans, metadata triples, candidate locations, acquisition
//! technologies and the decisions produced for each orphan.

pub mod candidate;
pub mod decision;
pub mod metadata;
pub mod path;
pub mod technology;

pub use candidate::{CandidateOrigin, CanonicalCandidate};
pub use decision::{Decision, DecisionKind, Evidence, MoveReason};
pub use metadata::{Avu, MetadataSet};
pub use path::{ObjectPath, OrphanObject, StoreEntry};
pub use technology::{Technology, TechnologyMatch, DEFAULT_PRECEDENCE};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Tty,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Tty
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
