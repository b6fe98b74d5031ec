//! CLI command implementations.

pub mod append;
pub mod dump;
pub mod inspect;
pub mod read;
pub mod reset;
pub mod truncate;

use seglog_core::{Config, Log, Record};
use serde::Serialize;
use std::path::Path;

/// A record prepared for output.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Record offset.
    pub offset: u64,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Value size in bytes.
    pub size: usize,
    /// Value as UTF-8, with invalid sequences replaced.
    pub value: String,
}

impl From<&Record> for RecordInfo {
    fn from(record: &Record) -> Self {
        Self {
            offset: record.offset,
            timestamp: record.timestamp,
            size: record.value.len(),
            value: String::from_utf8_lossy(&record.value).into_owned(),
        }
    }
}

impl RecordInfo {
    /// Formats the record as one line of text.
    pub fn to_line(&self) -> String {
        format!(
            "[{:08}] ts={} size={} {}",
            self.offset, self.timestamp, self.size, self.value
        )
    }
}

/// Opens an existing log, refusing to create one.
pub fn open_existing(path: &Path, config: Config) -> Result<Log, Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(format!("No log found at {}", path.display()).into());
    }
    Ok(Log::open(path, config)?)
}
