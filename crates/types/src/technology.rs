//! Acquisition technologies recognised in held paths

use lnf_errors::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sequencing technology that produced an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Illumina,
    PacBio,
    Ont,
    Sequenom,
    Fluidigm,
}

/// Precedence used when several technology tokens appear in one path
pub const DEFAULT_PRECEDENCE: [Technology; 5] = [
    Technology::Illumina,
    Technology::PacBio,
    Technology::Ont,
    Technology::Sequenom,
    Technology::Fluidigm,
];

impl Technology {
    /// Lowercase token as it appears in store paths
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Illumina => "illumina",
            Self::PacBio => "pacbio",
            Self::Ont => "ont",
            Self::Sequenom => "sequenom",
            Self::Fluidigm => "fluidigm",
        }
    }

    /// Illumina shares the run-folder heuristics with untagged orphans
    #[must_use]
    pub fn uses_run_folders(self) -> bool {
        matches!(self, Self::Illumina)
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Technology {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DEFAULT_PRECEDENCE
            .iter()
            .copied()
            .find(|tech| tech.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ResolveError::UnknownTechnology {
                name: s.to_string(),
            })
    }
}

/// How a technology token is recognised inside a held path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechnologyMatch {
    /// A whole path segment must equal the token
    Segment,
    /// The token may appear anywhere in the path text
    Substring,
}

impl Default for TechnologyMatch {
    fn default() -> Self {
        Self::Segment
    }
}
