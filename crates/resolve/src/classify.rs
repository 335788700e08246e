//! Technology labelling of held paths

use lnf_types::path::segments;
use lnf_types::{Technology, TechnologyMatch, DEFAULT_PRECEDENCE};

/// Labels an orphan with the technology named in its held path
///
/// Tokens are tried in precedence order and the first one present wins,
/// even when a later token appears earlier in the path.
#[derive(Debug, Clone)]
pub struct TechnologyClassifier {
    precedence: Vec<Technology>,
    matching: TechnologyMatch,
}

impl Default for TechnologyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PRECEDENCE.to_vec(), TechnologyMatch::default())
    }
}

impl TechnologyClassifier {
    #[must_use]
    pub fn new(precedence: Vec<Technology>, matching: TechnologyMatch) -> Self {
        Self {
            precedence,
            matching,
        }
    }

    #[must_use]
    pub fn matching(&self) -> TechnologyMatch {
        self.matching
    }

    /// First technology in precedence order whose token appears in `held_path`
    #[must_use]
    pub fn classify(&self, held_path: &str) -> Option<Technology> {
        self.precedence
            .iter()
            .copied()
            .find(|tech| token_position(held_path, tech.token(), self.matching).is_some())
    }
}

/// Where `token` occurs in `path`
///
/// For segment matching this is the index of the first segment equal to the
/// token. For substring matching it is the byte offset just past the first
/// occurrence of the token.
#[must_use]
pub fn token_position(path: &str, token: &str, matching: TechnologyMatch) -> Option<usize> {
    match matching {
        TechnologyMatch::Segment => segments(path)
            .iter()
            .position(|segment| segment.eq_ignore_ascii_case(token)),
        TechnologyMatch::Substring => path
            .to_ascii_lowercase()
            .find(&token.to_ascii_lowercase())
            .map(|start| start + token.len()),
    }
}
