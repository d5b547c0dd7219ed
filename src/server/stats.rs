//! Stats Recorder.
//!
//! Keeps exactly one record on disk: the last request that completed. Every
//! write truncates the destination under a lock shared by all workers, so
//! concurrent handlers can never interleave their lines.

use log::debug;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub path: String,
    pub size: u64,
    pub elapsed_secs: f64,
}

impl fmt::Display for ResponseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{:.4}", self.path, self.size, self.elapsed_secs)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordParseError {
    #[error("expected 3 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid size: {0}")]
    Size(String),

    #[error("invalid elapsed time: {0}")]
    Elapsed(String),
}

impl FromStr for ResponseRecord {
    type Err = RecordParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim_end_matches('\n').split('\t').collect();
        if fields.len() != 3 {
            return Err(RecordParseError::FieldCount(fields.len()));
        }

        let size = fields[1]
            .parse()
            .map_err(|_| RecordParseError::Size(fields[1].to_string()))?;
        let elapsed_secs = fields[2]
            .parse()
            .map_err(|_| RecordParseError::Elapsed(fields[2].to_string()))?;

        Ok(Self {
            path: fields[0].to_string(),
            size,
            elapsed_secs,
        })
    }
}

pub struct StatsRecorder {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StatsRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the stored record with `record`.
    ///
    /// An error here means the destination is unusable; callers treat it as fatal.
    pub fn record(&self, record: &ResponseRecord) -> io::Result<()> {
        // a worker that panicked while holding the lock left no partial state behind
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        write!(file, "{}", record)?;

        debug!("Stats updated: {}", record);
        Ok(())
    }

    pub fn read_last(&self) -> io::Result<Option<ResponseRecord>> {
        let contents = {
            let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
            match fs::read_to_string(&self.path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e),
            }
        };

        contents
            .parse()
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
