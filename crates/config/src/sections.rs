//! Configuration sections

use crate::constants;
use lnf_types::{ColorChoice, OutputFormat, Technology, TechnologyMatch, DEFAULT_PRECEDENCE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

/// Store namespace layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_canonical_root")]
    pub canonical_root: String,
    #[serde(default = "default_holding_collection")]
    pub holding_collection: String,
    #[serde(default = "default_holding_prefix_depth")]
    pub holding_prefix_depth: usize,
    /// Local directory mirroring the zone, used by the local backend
    pub local_root: Option<PathBuf>,
    #[serde(default = "default_checksum_key")]
    pub checksum_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            canonical_root: default_canonical_root(),
            holding_collection: default_holding_collection(),
            holding_prefix_depth: default_holding_prefix_depth(),
            local_root: None,
            checksum_key: default_checksum_key(),
        }
    }
}

/// Resolution heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Ordered precedence list; the first token found wins
    #[serde(default = "default_technologies")]
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub technology_match: TechnologyMatch,
    #[serde(default = "default_ancestor_search")]
    pub ancestor_search: bool,
    #[serde(default)]
    pub workers: usize, // 0 = auto-detect
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            technologies: default_technologies(),
            technology_match: TechnologyMatch::Segment,
            ancestor_search: true,
            workers: 0,
        }
    }
}

/// Output artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_checkpoint")]
    pub checkpoint: PathBuf,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    #[serde(default = "default_kept_log")]
    pub kept_log: PathBuf,
    #[serde(default = "default_still_lost_log")]
    pub still_lost_log: PathBuf,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            checkpoint: default_checkpoint(),
            script: default_script(),
            kept_log: default_kept_log(),
            still_lost_log: default_still_lost_log(),
            logs_dir: default_logs_dir(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_canonical_root() -> String {
    constants::CANONICAL_ROOT.to_string()
}

fn default_holding_collection() -> String {
    constants::HOLDING_COLLECTION.to_string()
}

fn default_holding_prefix_depth() -> usize {
    constants::HOLDING_PREFIX_DEPTH
}

fn default_checksum_key() -> String {
    constants::CHECKSUM_KEY.to_string()
}

fn default_technologies() -> Vec<Technology> {
    DEFAULT_PRECEDENCE.to_vec()
}

fn default_ancestor_search() -> bool {
    true
}

fn default_checkpoint() -> PathBuf {
    PathBuf::from(constants::CHECKPOINT_FILE)
}

fn default_script() -> PathBuf {
    PathBuf::from(constants::SCRIPT_FILE)
}

fn default_kept_log() -> PathBuf {
    PathBuf::from(constants::KEPT_FILE)
}

fn default_still_lost_log() -> PathBuf {
    PathBuf::from(constants::STILL_LOST_FILE)
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from(constants::LOGS_DIR)
}
