//! Technology-aware candidate generation

use lnf_errors::ResolveError;
use lnf_types::path::{join_under, segments};
use lnf_types::{CandidateOrigin, CanonicalCandidate, OrphanObject, Technology, TechnologyMatch};

use crate::classify::token_position;

/// Direct and archived run-folder candidates for one orphan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFolders {
    pub run_id: String,
    pub direct: CanonicalCandidate,
    pub archived: CanonicalCandidate,
}

impl RunFolders {
    /// Candidates in probing order; the active run folder comes first
    #[must_use]
    pub fn in_order(&self) -> [&CanonicalCandidate; 2] {
        [&self.direct, &self.archived]
    }
}

/// Builds the canonical locations an orphan may belong to
#[derive(Debug, Clone)]
pub struct CandidateLocator {
    canonical_root: String,
    matching: TechnologyMatch,
}

impl CandidateLocator {
    #[must_use]
    pub fn new(canonical_root: impl Into<String>, matching: TechnologyMatch) -> Self {
        Self {
            canonical_root: canonical_root.into(),
            matching,
        }
    }

    /// Run id is the part of the name before the first `_`
    ///
    /// # Errors
    ///
    /// Returns `MalformedOrphanPath` when the name has no `_` or the run id
    /// does not start with a digit.
    pub fn run_id<'a>(&self, orphan: &'a OrphanObject) -> Result<&'a str, ResolveError> {
        let malformed = |reason: &str| ResolveError::MalformedOrphanPath {
            path: orphan.to_string(),
            reason: reason.to_string(),
        };
        let (run_id, _) = orphan
            .name()
            .split_once('_')
            .ok_or_else(|| malformed("name has no run id separator"))?;
        if !run_id.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(malformed("run id does not start with a digit"));
        }
        Ok(run_id)
    }

    /// `{root}/{run}` and `{root}/illumina/runs/{run[..2]}/{run}`
    ///
    /// # Errors
    ///
    /// Propagates the run id errors of [`Self::run_id`].
    pub fn run_folders(&self, orphan: &OrphanObject) -> Result<RunFolders, ResolveError> {
        let run_id = self.run_id(orphan)?;
        let shard: String = run_id.chars().take(2).collect();
        let direct = join_under(&self.canonical_root, &[run_id]);
        let archived = join_under(
            &self.canonical_root,
            &[Technology::Illumina.token(), "runs", shard.as_str(), run_id],
        );
        Ok(RunFolders {
            run_id: run_id.to_string(),
            direct: CanonicalCandidate::new(direct, orphan.name(), CandidateOrigin::DirectRunFolder),
            archived: CanonicalCandidate::new(
                archived,
                orphan.name(),
                CandidateOrigin::ArchivedRunFolder,
            ),
        })
    }

    /// Held path spliced at the technology token under `{root}/{technology}`
    ///
    /// `/seq/lostandfound/b4/pacbio/r64/A01` becomes `/seq/pacbio/r64/A01`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedOrphanPath` if the token does not occur in the held path.
    pub fn technology_candidate(
        &self,
        orphan: &OrphanObject,
        technology: Technology,
    ) -> Result<CanonicalCandidate, ResolveError> {
        let held = orphan.held_path();
        let position = token_position(held, technology.token(), self.matching).ok_or_else(|| {
            ResolveError::MalformedOrphanPath {
                path: orphan.to_string(),
                reason: format!("no {technology} token in held path"),
            }
        })?;

        let tail: Vec<&str> = match self.matching {
            TechnologyMatch::Segment => segments(held).into_iter().skip(position + 1).collect(),
            TechnologyMatch::Substring => segments(&held[position..]),
        };
        let base = join_under(&self.canonical_root, &[technology.token()]);
        Ok(CanonicalCandidate::new(
            join_under(&base, &tail),
            orphan.name(),
            CandidateOrigin::Technology(technology),
        ))
    }
}
