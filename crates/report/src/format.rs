//! Text of the lines written for each decision

use std::borrow::Cow;
use std::fmt;

use lnf_types::{Decision, MoveReason};
use serde::{Deserialize, Serialize};

/// Output artifact a decision is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sink {
    /// Executable remediation commands
    Script,
    /// Orphans deliberately left in place
    Kept,
    /// Orphans with no known location
    StillLost,
}

impl Sink {
    pub const ALL: [Sink; 3] = [Sink::Script, Sink::Kept, Sink::StillLost];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Kept => "kept",
            Self::StillLost => "still_lost",
        }
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line ready to be appended, without its trailing newline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub sink: Sink,
    pub line: String,
}

/// Render a decision as the line its sink receives
///
/// Only `Remove` and `Move` become commands. Everything else is prose and
/// goes to one of the logs, so the script never holds anything that was
/// not meant to be run. A command whose paths hold control characters is
/// refused and logged as kept instead.
#[must_use]
pub fn format_record(decision: &Decision) -> Record {
    if decision.is_actionable() && !scriptable(decision) {
        return Record {
            sink: Sink::Kept,
            line: format!(
                "{} kept, control characters in a path make the {} line unsafe to script",
                printable(&decision.orphan().full_path()),
                decision.kind()
            ),
        };
    }

    match decision {
        // Structural and content-search evidence read the same in the script.
        Decision::Remove {
            orphan, existing, ..
        } => Record {
            sink: Sink::Script,
            line: format!(
                "irm {} # md5 ok, md5 meta ok, exists as {existing}",
                quote(&orphan.full_path())
            ),
        },
        Decision::Move {
            orphan,
            target,
            reason,
        } => {
            let destination = orphan.in_collection(target);
            let place = match reason {
                MoveReason::RunFolder => "runfolder",
                MoveReason::Collection => "collection",
            };
            Record {
                sink: Sink::Script,
                line: format!(
                    "imv {} {} # {} not present, {place} at {target}",
                    quote(&orphan.full_path()),
                    quote(&destination.full_path()),
                    orphan.name
                ),
            }
        }
        Decision::KeepChecksumMismatch { orphan, .. } => Record {
            sink: Sink::Kept,
            line: format!(
                "{} kept due to difference in checksum compared with the current file",
                printable(&orphan.full_path())
            ),
        },
        Decision::KeepMetadataMissing { orphan, .. } => Record {
            sink: Sink::Kept,
            line: format!(
                "{} kept due to incorrect md5 metadata on the current file",
                printable(&orphan.full_path())
            ),
        },
        Decision::KeepAmbiguous {
            orphan,
            direct,
            archived,
        } => Record {
            sink: Sink::Kept,
            line: format!(
                "{} kept, two possible runfolders for this run, {} and {}",
                printable(&orphan.full_path()),
                printable(direct),
                printable(archived)
            ),
        },
        Decision::StillLost { orphan } => Record {
            sink: Sink::StillLost,
            line: format!(
                "{} kept because a location has not been found",
                printable(&orphan.full_path())
            ),
        },
    }
}

/// Whether every path a command would mention can sit on one script line
fn scriptable(decision: &Decision) -> bool {
    let paths = match decision {
        Decision::Remove {
            orphan, existing, ..
        } => vec![orphan.full_path(), existing.full_path()],
        Decision::Move { orphan, target, .. } => vec![
            orphan.full_path(),
            orphan.in_collection(target).full_path(),
        ],
        _ => return false,
    };
    paths.iter().all(|path| !path.chars().any(char::is_control))
}

/// Escape control characters so log text never spans lines
fn printable(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}

/// Quote a path for a POSIX shell if it needs it
///
/// Paths made only of shell-safe characters are returned untouched.
#[must_use]
pub fn quote(path: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_ascii_alphanumeric() || "_-./@%+=:,".contains(c);
    if !path.is_empty() && path.chars().all(safe) {
        return Cow::Borrowed(path);
    }
    Cow::Owned(format!("'{}'", path.replace('\'', r"'\''")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnf_types::{CandidateOrigin, Evidence, ObjectPath};

    fn orphan() -> ObjectPath {
        ObjectPath::new("/seq/lostandfound/x/y", "12345_1.bam")
    }

    #[test]
    fn structural_remove_line() {
        let record = format_record(&Decision::Remove {
            orphan: orphan(),
            existing: ObjectPath::new("/seq/12345", "12345_1.bam"),
            evidence: Evidence::Structural(CandidateOrigin::DirectRunFolder),
        });
        assert_eq!(record.sink, Sink::Script);
        assert_eq!(
            record.line,
            "irm /seq/lostandfound/x/y/12345_1.bam # md5 ok, md5 meta ok, exists as /seq/12345/12345_1.bam"
        );
    }

    #[test]
    fn move_lines_name_the_target_kind() {
        let run_folder = format_record(&Decision::Move {
            orphan: orphan(),
            target: "/seq/illumina/runs/12/12345".to_string(),
            reason: MoveReason::RunFolder,
        });
        assert_eq!(
            run_folder.line,
            "imv /seq/lostandfound/x/y/12345_1.bam /seq/illumina/runs/12/12345/12345_1.bam \
             # 12345_1.bam not present, runfolder at /seq/illumina/runs/12/12345"
        );

        let collection = format_record(&Decision::Move {
            orphan: orphan(),
            target: "/seq/proj".to_string(),
            reason: MoveReason::Collection,
        });
        assert!(collection
            .line
            .ends_with("# 12345_1.bam not present, collection at /seq/proj"));
    }

    #[test]
    fn keep_lines_go_to_the_logs() {
        let existing = ObjectPath::new("/seq/12345", "12345_1.bam");
        let cases = [
            (
                Decision::KeepChecksumMismatch {
                    orphan: orphan(),
                    existing: existing.clone(),
                },
                Sink::Kept,
                "/seq/lostandfound/x/y/12345_1.bam kept due to difference in checksum compared with the current file",
            ),
            (
                Decision::KeepMetadataMissing {
                    orphan: orphan(),
                    existing,
                },
                Sink::Kept,
                "/seq/lostandfound/x/y/12345_1.bam kept due to incorrect md5 metadata on the current file",
            ),
            (
                Decision::KeepAmbiguous {
                    orphan: orphan(),
                    direct: "/seq/12345".to_string(),
                    archived: "/seq/illumina/runs/12/12345".to_string(),
                },
                Sink::Kept,
                "/seq/lostandfound/x/y/12345_1.bam kept, two possible runfolders for this run, /seq/12345 and /seq/illumina/runs/12/12345",
            ),
            (
                Decision::StillLost { orphan: orphan() },
                Sink::StillLost,
                "/seq/lostandfound/x/y/12345_1.bam kept because a location has not been found",
            ),
        ];
        for (decision, sink, line) in cases {
            let record = format_record(&decision);
            assert_eq!(record.sink, sink);
            assert_eq!(record.line, line);
        }
    }

    #[test]
    fn control_characters_never_reach_the_script() {
        let hostile = ObjectPath::new("/seq/lostandfound/x/y", "12345_1.bam\nrm -rf ~");
        let existing = ObjectPath::new("/seq/12345", "12345_1.bam\nrm -rf ~");
        let decisions = [
            Decision::Remove {
                orphan: hostile.clone(),
                existing: existing.clone(),
                evidence: Evidence::Structural(CandidateOrigin::DirectRunFolder),
            },
            Decision::Remove {
                orphan: orphan(),
                existing: existing.clone(),
                evidence: Evidence::ContentSearch,
            },
            Decision::Move {
                orphan: hostile.clone(),
                target: "/seq/12345".to_string(),
                reason: MoveReason::RunFolder,
            },
            Decision::Move {
                orphan: orphan(),
                target: "/seq/proj\r\nreboot".to_string(),
                reason: MoveReason::Collection,
            },
            Decision::KeepChecksumMismatch {
                orphan: hostile.clone(),
                existing: existing.clone(),
            },
            Decision::KeepMetadataMissing {
                orphan: hostile.clone(),
                existing,
            },
            Decision::KeepAmbiguous {
                orphan: hostile.clone(),
                direct: "/seq/12345\n".to_string(),
                archived: "/seq/illumina/runs/12/12345".to_string(),
            },
            Decision::StillLost { orphan: hostile },
        ];

        for decision in &decisions {
            let record = format_record(decision);
            assert!(!record.line.contains('\n'), "{record:?}");
            assert!(!record.line.contains('\r'), "{record:?}");
            assert_ne!(record.sink, Sink::Script, "{record:?}");
        }

        let refused = format_record(&decisions[2]);
        assert_eq!(refused.sink, Sink::Kept);
        assert_eq!(
            refused.line,
            "/seq/lostandfound/x/y/12345_1.bam\\nrm -rf ~ kept, control characters in a path \
             make the move line unsafe to script"
        );
    }

    #[test]
    fn quoting_only_when_needed() {
        assert_eq!(quote("/seq/a_b/c-1.bam"), "/seq/a_b/c-1.bam");
        assert_eq!(quote("/seq/a b/c.bam"), "'/seq/a b/c.bam'");
        assert_eq!(quote("/seq/it's.bam"), r"'/seq/it'\''s.bam'");
        assert_eq!(quote("/seq/$HOME"), "'/seq/$HOME'");
    }
}
