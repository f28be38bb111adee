//! Append-only CSV log of alert episodes.
//!
//! One row per episode, never rewritten. The file is created with its header
//! row on first append. All appends happen on the dispatch worker thread, so
//! records are written whole; a write failure is surfaced to the caller
//! because it means lost evidence.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

pub const LOG_HEADER: [&str; 7] = [
    "Date",
    "Time",
    "City",
    "Latitude",
    "Longitude",
    "Severity",
    "Pothole_Count",
];

/// One alert episode as logged. Coordinates are kept as strings because a
/// failed geolocation lookup records the literal placeholder "N/A".
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub date: String,
    pub time: String,
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub severity: String,
    pub count: usize,
}

pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file (and its header) if needed.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory {}", parent.display())
                })?;
            }
        }

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open log file {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(LOG_HEADER)?;
        }

        let count = record.count.to_string();
        writer.write_record([
            record.date.as_str(),
            record.time.as_str(),
            record.city.as_str(),
            record.latitude.as_str(),
            record.longitude.as_str(),
            record.severity.as_str(),
            count.as_str(),
        ])?;
        writer
            .flush()
            .with_context(|| format!("failed to flush log file {}", self.path.display()))?;
        Ok(())
    }

    /// Read every record back. Used by the log viewer and tests.
    pub fn read_all(&self) -> Result<Vec<LogRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open log file {}", self.path.display()))?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.context("malformed log row")?;
            if row.len() != LOG_HEADER.len() {
                return Err(anyhow!(
                    "log row has {} fields, expected {}",
                    row.len(),
                    LOG_HEADER.len()
                ));
            }
            records.push(LogRecord {
                date: row[0].to_string(),
                time: row[1].to_string(),
                city: row[2].to_string(),
                latitude: row[3].to_string(),
                longitude: row[4].to_string(),
                severity: row[5].to_string(),
                count: row[6]
                    .parse()
                    .with_context(|| format!("bad pothole count '{}'", &row[6]))?,
            });
        }
        Ok(records)
    }
}
