//! Command line interface definition

use clap::{Parser, Subcommand};
use lnf_types::ColorChoice;
use std::path::PathBuf;

/// lnf - Reconcile orphaned objects with their canonical location
#[derive(Parser)]
#[command(name = "lnf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reconcile orphaned objects with their canonical location")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to the configured logs directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Output artifact overrides shared by commands that touch them
#[derive(Parser)]
pub struct ArtifactArgs {
    /// Checkpoint file listing the orphans of the holding collection
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,

    /// Directory mirroring the zone for the local store
    #[arg(long, value_name = "DIR")]
    pub store_root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Decide the fate of every orphan and write the remediation script
    #[command(alias = "run")]
    Resolve {
        /// Number of concurrent workers (0=auto)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// Remediation script to append to
        #[arg(long, value_name = "PATH")]
        script: Option<PathBuf>,

        /// Log of orphans kept for review
        #[arg(long, value_name = "PATH")]
        kept: Option<PathBuf>,

        /// Log of orphans with no known location
        #[arg(long, value_name = "PATH")]
        still_lost: Option<PathBuf>,
    },

    /// Enumerate orphans without resolving them
    #[command(alias = "ls")]
    Inventory {
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },

    /// Show the decision for a single orphan without writing anything
    Explain {
        /// Collection the orphan is held in
        held_collection: String,

        /// Object name
        name: String,

        /// Directory mirroring the zone for the local store
        #[arg(long, value_name = "DIR")]
        store_root: Option<PathBuf>,
    },

    /// Print the technology label for a held path
    Classify {
        /// Held path to classify
        held_path: String,
    },
}
