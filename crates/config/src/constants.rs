//! Built-in defaults matching the production `/seq` zone layout

pub const CANONICAL_ROOT: &str = "/seq";
pub const HOLDING_COLLECTION: &str = "/seq/lostandfound";

/// Leading held-path segments that belong to the holding area itself:
/// `seq`, `lostandfound` and the per-batch collection below it.
pub const HOLDING_PREFIX_DEPTH: usize = 3;

pub const CHECKSUM_KEY: &str = "md5";

pub const CHECKPOINT_FILE: &str = "objects";
pub const SCRIPT_FILE: &str = "resolve_orphaned_files.sh";
pub const KEPT_FILE: &str = "kept_files";
pub const STILL_LOST_FILE: &str = "still_lost_files";
pub const LOGS_DIR: &str = "logs";
