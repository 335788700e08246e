//! Append-only list of orphans already enumerated

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use lnf_errors::{Error, InventoryError};
use lnf_types::ObjectPath;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Trailer written once a traversal has listed every orphan
pub const COMPLETE_MARKER: &str = "# complete";

/// Orphans recovered from an existing checkpoint file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub entries: Vec<ObjectPath>,
    /// Whether the completion trailer was present
    pub complete: bool,
}

/// Read a checkpoint if one exists
///
/// Blank lines and lines starting with `#` are ignored apart from
/// recognising the completion trailer. Entries are unescaped, so names
/// holding backslashes or control characters come back unchanged.
///
/// # Errors
///
/// Returns `CheckpointUnreadable` if the file exists but cannot be read and
/// `MalformedEntry` for a line that is not an absolute object path.
pub async fn read(path: &Path) -> Result<Option<Replay>, Error> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(InventoryError::CheckpointUnreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into())
        }
    };

    let mut entries = Vec::new();
    let mut complete = false;
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('#') {
            complete |= line.trim() == COMPLETE_MARKER;
            continue;
        }
        let entry = unescape(line)
            .and_then(|decoded| ObjectPath::parse(&decoded))
            .ok_or_else(|| InventoryError::MalformedEntry {
            line: index + 1,
            entry: line.to_string(),
        })?;
        entries.push(entry);
    }

    Ok(Some(Replay { entries, complete }))
}

/// Append side of the checkpoint
///
/// Every entry is flushed before `append` returns so an orphan is never
/// handed out before it is on disk.
#[derive(Debug)]
pub struct CheckpointWriter {
    file: File,
    path: PathBuf,
}

impl CheckpointWriter {
    /// Open `path` for appending, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `CheckpointWrite` if the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| write_error(path, &e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Record one orphan on a line of its own
    ///
    /// # Errors
    ///
    /// Returns `CheckpointWrite` if the line cannot be written or flushed.
    pub async fn append(&mut self, entry: &ObjectPath) -> Result<(), Error> {
        self.write_line(&escape(&entry.full_path())).await
    }

    /// Mark the traversal as finished
    ///
    /// # Errors
    ///
    /// Returns `CheckpointWrite` if the trailer cannot be written.
    pub async fn complete(mut self) -> Result<(), Error> {
        self.write_line(COMPLETE_MARKER).await?;
        self.file
            .sync_all()
            .await
            .map_err(|e| write_error(&self.path, &e))
    }

    async fn write_line(&mut self, line: &str) -> Result<(), Error> {
        let record = format!("{line}\n");
        self.file
            .write_all(record.as_bytes())
            .await
            .map_err(|e| write_error(&self.path, &e))?;
        self.file
            .flush()
            .await
            .map_err(|e| write_error(&self.path, &e))
    }
}

/// Backslashes are doubled and control characters become `\u{..}`
fn escape(path: &str) -> Cow<'_, str> {
    if !path.chars().any(|c| c == '\\' || c.is_control()) {
        return Cow::Borrowed(path);
    }
    let mut escaped = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            c if c.is_control() => escaped.extend(c.escape_unicode()),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn unescape(line: &str) -> Option<String> {
    let mut decoded = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => decoded.push('\\'),
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let mut hex = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        digit => hex.push(digit),
                    }
                }
                decoded.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            _ => return None,
        }
    }
    Some(decoded)
}

fn write_error(path: &Path, err: &std::io::Error) -> Error {
    InventoryError::CheckpointWrite {
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_checkpoint_reads_as_none() {
        let temp = TempDir::new().unwrap();
        assert!(read(&temp.path().join("objects")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writer_appends_and_marks_complete() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("objects");

        let mut writer = CheckpointWriter::open(&path).await.unwrap();
        writer
            .append(&ObjectPath::new("/seq/lostandfound/b1", "a.cram"))
            .await
            .unwrap();
        let partial = read(&path).await.unwrap().unwrap();
        assert_eq!(partial.entries.len(), 1);
        assert!(!partial.complete);

        writer.complete().await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "/seq/lostandfound/b1/a.cram\n# complete\n");
        assert!(read(&path).await.unwrap().unwrap().complete);
    }

    #[tokio::test]
    async fn comments_and_blank_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("objects");
        tokio::fs::write(&path, "# written by hand\n\n/seq/lostandfound/b1/a\r\n")
            .await
            .unwrap();

        let replay = read(&path).await.unwrap().unwrap();
        assert_eq!(
            replay.entries,
            vec![ObjectPath::new("/seq/lostandfound/b1", "a")]
        );
        assert!(!replay.complete);
    }

    #[tokio::test]
    async fn awkward_names_survive_a_replay() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("objects");
        let entries = vec![
            ObjectPath::new("/seq/lostandfound/b1", "a.bam "),
            ObjectPath::new("/seq/lostandfound/b1", " b.bam"),
            ObjectPath::new("/seq/lostandfound/b1", "12345_1.bam\nrm -rf ~"),
            ObjectPath::new("/seq/lostandfound/b1", "tab\there\r"),
            ObjectPath::new("/seq/lostandfound/b1", r"back\slash\u{41}"),
        ];

        let mut writer = CheckpointWriter::open(&path).await.unwrap();
        for entry in &entries {
            writer.append(entry).await.unwrap();
        }
        writer.complete().await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().count(), entries.len() + 1);

        let replay = read(&path).await.unwrap().unwrap();
        assert_eq!(replay.entries, entries);
        assert!(replay.complete);
    }

    #[test]
    fn plain_paths_are_written_verbatim() {
        assert!(matches!(
            escape("/seq/lostandfound/b1/12345_1.bam"),
            Cow::Borrowed(_)
        ));
        assert_eq!(escape("/a/x\ny"), r"/a/x\u{a}y");
        assert_eq!(unescape(r"/a/x\u{a}y").as_deref(), Some("/a/x\ny"));
        assert_eq!(unescape(r"/a/bad\q"), None);
        assert_eq!(unescape(r"/a/open\u{41"), None);
    }

    #[tokio::test]
    async fn relative_entry_is_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("objects");
        tokio::fs::write(&path, "/seq/lostandfound/b1/a\nrelative/b\n")
            .await
            .unwrap();

        let err = read(&path).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Inventory(InventoryError::MalformedEntry { line: 2, .. })
        ));
    }
}
