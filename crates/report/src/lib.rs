#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Output artifacts for lnf decisions
//!
//! `Remove` and `Move` decisions become lines in a reviewable shell script.
//! Keep decisions and still-lost orphans are written as plain prose to two
//! separate logs and never appear in the script.

mod format;
mod recorder;

pub use format::{format_record, quote, Record, Sink};
pub use recorder::{ActionRecorder, SinkPaths, SinkTotals};
