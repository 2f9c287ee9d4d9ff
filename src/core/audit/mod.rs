//! CSV audit sink
//!
//! Appends one row per retained match. The column order is stable for
//! downstream tooling: doc_id, field_path, detector, raw_match,
//! normalized_value, deduped. The sink is flushed on every exit path so
//! partial output after a fatal abort is still a valid, loadable CSV.

use crate::domain::{RawMatch, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Stable audit column order
pub const AUDIT_HEADERS: &[&str] = &[
    "doc_id",
    "field_path",
    "detector",
    "raw_match",
    "normalized_value",
    "deduped",
];

/// Append-only CSV audit writer
pub struct AuditSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: usize,
}

impl AuditSink {
    /// Create the audit file and write the header row
    ///
    /// Parent directories are created as needed. An existing file is
    /// truncated: each run produces a fresh audit record.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(AUDIT_HEADERS)?;
        writer.flush()?;

        Ok(Self {
            writer,
            path,
            rows_written: 0,
        })
    }

    /// Append one match row
    ///
    /// `deduped` records whether the run's dedupe policy applied to this
    /// row (i.e. duplicates of it were suppressed rather than emitted).
    pub fn emit(&mut self, raw: &RawMatch, deduped: bool) -> Result<()> {
        self.writer.write_record([
            raw.document_id.as_str(),
            raw.field_path.as_str(),
            raw.detector_name.as_str(),
            raw.raw_text.as_str(),
            raw.normalized_text.as_str(),
            if deduped { "true" } else { "false" },
        ])?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of rows written so far (header excluded)
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Path of the audit file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered rows to disk
    ///
    /// Called after every page and on every exit path, including the fatal
    /// retrieval abort, so no row is ever left half-written.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
