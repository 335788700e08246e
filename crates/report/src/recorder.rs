//! Shared append-only sinks for decisions

use std::path::{Path, PathBuf};

use lnf_config::OutputConfig;
use lnf_errors::{Error, ReportError};
use lnf_types::Decision;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::format::{format_record, Record, Sink};

/// Where each sink lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkPaths {
    pub script: PathBuf,
    pub kept: PathBuf,
    pub still_lost: PathBuf,
}

impl SinkPaths {
    #[must_use]
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            script: output.script.clone(),
            kept: output.kept_log.clone(),
            still_lost: output.still_lost_log.clone(),
        }
    }

    #[must_use]
    pub fn path(&self, sink: Sink) -> &Path {
        match sink {
            Sink::Script => &self.script,
            Sink::Kept => &self.kept,
            Sink::StillLost => &self.still_lost,
        }
    }
}

/// Lines written to each sink during this run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkTotals {
    pub script: u64,
    pub kept: u64,
    pub still_lost: u64,
}

#[derive(Debug)]
struct SinkFile {
    sink: Sink,
    path: PathBuf,
    file: File,
    lines: u64,
}

impl SinkFile {
    async fn open(sink: Sink, path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| ReportError::SinkOpen {
                sink: sink.to_string(),
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            sink,
            path: path.to_path_buf(),
            file,
            lines: 0,
        })
    }

    async fn append(&mut self, line: &str) -> Result<(), Error> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        self.file
            .write_all(record.as_bytes())
            .await
            .map_err(|e| self.write_error(&e))?;
        self.file.flush().await.map_err(|e| self.write_error(&e))?;
        self.lines += 1;
        Ok(())
    }

    async fn sync(&mut self) -> Result<(), Error> {
        self.file.flush().await.map_err(|e| self.write_error(&e))?;
        self.file.sync_all().await.map_err(|e| self.write_error(&e))
    }

    fn write_error(&self, err: &std::io::Error) -> Error {
        ReportError::SinkWrite {
            sink: self.sink.to_string(),
            message: format!("{}: {err}", self.path.display()),
        }
        .into()
    }
}

/// Appends one line per decision to the sink the decision belongs in
///
/// Each sink has its own lock and every record goes out in a single write,
/// so concurrent workers can share one recorder without interleaving lines.
/// Sinks are opened in append mode; earlier runs are never truncated.
#[derive(Debug)]
pub struct ActionRecorder {
    script: Mutex<SinkFile>,
    kept: Mutex<SinkFile>,
    still_lost: Mutex<SinkFile>,
}

impl ActionRecorder {
    /// Open all three sinks, creating missing files
    ///
    /// # Errors
    ///
    /// Returns `SinkOpen` for the first sink that cannot be opened.
    pub async fn open(paths: &SinkPaths) -> Result<Self, Error> {
        Ok(Self {
            script: Mutex::new(SinkFile::open(Sink::Script, &paths.script).await?),
            kept: Mutex::new(SinkFile::open(Sink::Kept, &paths.kept).await?),
            still_lost: Mutex::new(SinkFile::open(Sink::StillLost, &paths.still_lost).await?),
        })
    }

    fn sink(&self, sink: Sink) -> &Mutex<SinkFile> {
        match sink {
            Sink::Script => &self.script,
            Sink::Kept => &self.kept,
            Sink::StillLost => &self.still_lost,
        }
    }

    /// Write the line for `decision` and return the record written
    ///
    /// # Errors
    ///
    /// Returns `SinkWrite` if the line cannot be written or flushed.
    pub async fn record(&self, decision: &Decision) -> Result<Record, Error> {
        let record = format_record(decision);
        self.sink(record.sink).lock().await.append(&record.line).await?;
        Ok(record)
    }

    /// Lines written so far, per sink
    pub async fn totals(&self) -> SinkTotals {
        SinkTotals {
            script: self.script.lock().await.lines,
            kept: self.kept.lock().await.lines,
            still_lost: self.still_lost.lock().await.lines,
        }
    }

    /// Flush every sink to disk and close it
    ///
    /// # Errors
    ///
    /// Returns `SinkWrite` for the first sink that cannot be synced. The
    /// other sinks are still synced.
    pub async fn finish(self) -> Result<SinkTotals, Error> {
        let mut first_error = None;
        let mut totals = SinkTotals::default();
        for sink in Sink::ALL {
            let mut file = self.sink(sink).lock().await;
            if let Err(e) = file.sync().await {
                first_error.get_or_insert(e);
            }
            match sink {
                Sink::Script => totals.script = file.lines,
                Sink::Kept => totals.kept = file.lines,
                Sink::StillLost => totals.still_lost = file.lines,
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(totals),
        }
    }
}
