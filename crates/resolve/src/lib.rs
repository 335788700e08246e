#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Decision engine for orphaned objects
//!
//! Given one orphan, the [`Resolver`] works out where the object most likely
//! came from and whether an identical copy is already in place there. Every
//! component only reads the store; acting on a decision is left to the
//! report writer and the operator.

pub mod classify;
pub mod fallback;
pub mod locate;
pub mod multiplicity;
pub mod reconstruct;
pub mod subject;
pub mod verify;

mod pipeline;

pub use classify::TechnologyClassifier;
pub use fallback::{ContentFallbackSearch, SearchOutcome};
pub use locate::{CandidateLocator, RunFolders};
pub use multiplicity::{MultiplicityResolver, ParentOutcome};
pub use pipeline::{Resolution, Resolver, ResolverSettings};
pub use reconstruct::PathReconstructor;
pub use subject::Subject;
pub use verify::IdentityVerifier;
