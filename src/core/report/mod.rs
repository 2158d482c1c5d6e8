//! # Report Module
//!
//! Counters and the timestamp failure list for one export run.
//!
//! The report is an explicit value owned by the pipeline driver. Counters
//! only ever go up; a parallel driver would fold per-worker reports
//! together with [`Report::merge`].

use crate::core::resolver::VariantKind;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// An exported file whose capture date could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTimestampEntry {
    pub path: PathBuf,
    pub date: DateTime<FixedOffset>,
}

impl FailedTimestampEntry {
    /// Capture date as unix seconds, for setting the time by hand
    pub fn timestamp(&self) -> i64 {
        self.date.timestamp()
    }
}

/// End-of-run export summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    originals_exported: u64,
    edits_exported: u64,
    live_photos_exported: u64,
    duplicates_skipped: u64,
    duplicates_created: u64,
    failed_timestamps: Vec<FailedTimestampEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a completed export of one variant
    pub fn record_exported(&mut self, kind: VariantKind) {
        match kind {
            VariantKind::Original => self.originals_exported += 1,
            VariantKind::Edited => self.edits_exported += 1,
            VariantKind::Live => self.live_photos_exported += 1,
        }
    }

    pub fn record_duplicate_skipped(&mut self) {
        self.duplicates_skipped += 1;
    }

    /// Count an export the primitive wrote to a collision sibling
    pub fn record_duplicate_created(&mut self) {
        self.duplicates_created += 1;
    }

    pub fn record_timestamp_failure(&mut self, entry: FailedTimestampEntry) {
        self.failed_timestamps.push(entry);
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: Report) {
        self.originals_exported += other.originals_exported;
        self.edits_exported += other.edits_exported;
        self.live_photos_exported += other.live_photos_exported;
        self.duplicates_skipped += other.duplicates_skipped;
        self.duplicates_created += other.duplicates_created;
        self.failed_timestamps.extend(other.failed_timestamps);
    }

    pub fn originals_exported(&self) -> u64 {
        self.originals_exported
    }

    pub fn edits_exported(&self) -> u64 {
        self.edits_exported
    }

    pub fn live_photos_exported(&self) -> u64 {
        self.live_photos_exported
    }

    pub fn duplicates_skipped(&self) -> u64 {
        self.duplicates_skipped
    }

    pub fn duplicates_created(&self) -> u64 {
        self.duplicates_created
    }

    pub fn failed_timestamps(&self) -> &[FailedTimestampEntry] {
        &self.failed_timestamps
    }

    /// Exports of any variant
    pub fn total_exported(&self) -> u64 {
        self.originals_exported + self.edits_exported + self.live_photos_exported
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Export Report ---")?;
        writeln!(f, "Original photos exported: {}", self.originals_exported)?;
        writeln!(f, "Edited photos exported: {}", self.edits_exported)?;
        writeln!(f, "Live photos exported: {}", self.live_photos_exported)?;
        writeln!(f, "Duplicates skipped: {}", self.duplicates_skipped)?;
        writeln!(f, "Duplicates created: {}", self.duplicates_created)?;
        writeln!(f)?;
        writeln!(f, "Files that failed to set timestamp:")?;
        for entry in &self.failed_timestamps {
            writeln!(
                f,
                "Path: {}, Date: {}, Timestamp: {}",
                entry.path.display(),
                entry.date,
                entry.timestamp()
            )?;
        }
        Ok(())
    }
}
