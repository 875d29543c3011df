use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One entry of [`HistoryLog::tail`], numbered from the start of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub index: usize,
    pub command: String,
}

/// Append-only command history, one line per entered command.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, line: &str) -> Result<(), HistoryError> {
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        writeln!(file, "{line}").map_err(write_err)
    }

    /// Every recorded line, oldest first. A log that was never written is
    /// empty.
    pub fn read_all(&self) -> Result<Vec<String>, HistoryError> {
        let read_err = |source| HistoryError::Read {
            path: self.path.clone(),
            source,
        };
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(read_err(err)),
        };

        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            lines.push(line.map_err(read_err)?);
        }
        Ok(lines)
    }

    /// The last `limit` lines, keeping their 1-based position in the log.
    pub fn tail(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let lines = self.read_all()?;
        let offset = lines.len().saturating_sub(limit);
        Ok(lines
            .into_iter()
            .enumerate()
            .skip(offset)
            .map(|(idx, command)| HistoryEntry {
                index: idx + 1,
                command,
            })
            .collect())
    }
}
