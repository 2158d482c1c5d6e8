//! # Reconciler Module
//!
//! Decides, for one variant of one photo, whether to export, skip, or adopt
//! an existing collision sibling.
//!
//! ## Decision Table
//! | Target | Content | `(1)` sibling before export | Result |
//! |--------|---------|-----------------------------|--------|
//! | absent | -       | -                           | export, stamp, count |
//! | exists | same    | -                           | duplicate skipped |
//! | exists | differs | exists, same content        | duplicate skipped |
//! | exists | differs | exists, other content       | unresolved, nothing counted |
//! | exists | differs | absent                      | export, adopt sibling if the primitive created one |
//!
//! The sibling is only ever looked at after an exact collision on the
//! target path. The pre-existence check is not atomic with the export
//! call, so two exports of the same target must never run concurrently.

use crate::core::comparator::{ComparisonMethod, FileComparator};
use crate::core::library::{LibrarySource, PhotoRecord};
use crate::core::report::{FailedTimestampEntry, Report};
use crate::core::resolver::{ExportTarget, VariantKind};
use crate::core::timestamp::TimestampSynchronizer;
use crate::error::PhotoExportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Terminal state of one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantOutcome {
    /// Bytes were written; `path` is where they actually landed
    Exported {
        path: PathBuf,
        /// The primitive wrote to the collision sibling
        created_duplicate: bool,
        /// The capture date was applied to `path`
        timestamp_synced: bool,
    },
    /// An existing file at `path` already holds this content
    Duplicate {
        path: PathBuf,
        method: ComparisonMethod,
    },
    /// Target and sibling both hold other content; left for manual review
    Unresolved { path: PathBuf },
}

impl VariantOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, VariantOutcome::Duplicate { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            VariantOutcome::Exported { path, .. }
            | VariantOutcome::Duplicate { path, .. }
            | VariantOutcome::Unresolved { path } => path,
        }
    }
}

/// Per-variant export state machine
pub struct DuplicateReconciler {
    comparator: Box<dyn FileComparator>,
    synchronizer: TimestampSynchronizer,
}

impl DuplicateReconciler {
    pub fn new(comparator: Box<dyn FileComparator>, synchronizer: TimestampSynchronizer) -> Self {
        Self {
            comparator,
            synchronizer,
        }
    }

    /// Reconcile one variant against the export tree, recording into `report`
    pub fn reconcile(
        &self,
        library: &dyn LibrarySource,
        photo: &PhotoRecord,
        target: &ExportTarget,
        report: &mut Report,
    ) -> Result<VariantOutcome, PhotoExportError> {
        let path = target.path();
        let kind = target.kind;

        if !path.exists() {
            info!(variant = %kind, path = %path.display(), "Exporting photo");
            library.export(photo, target)?;
            return Ok(self.finish_export(photo, kind, path, false, report));
        }

        let source = photo.comparison_source(kind)?;
        let outcome = self.comparator.compare(source, &path)?;
        if outcome.matched {
            info!(variant = %kind, path = %path.display(), method = %outcome.method, "Skipping duplicate photo");
            report.record_duplicate_skipped();
            return Ok(VariantOutcome::Duplicate {
                path,
                method: outcome.method,
            });
        }

        let sibling = target.collision_path();
        if sibling.exists() {
            let sibling_outcome = self.comparator.compare(source, &sibling)?;
            if sibling_outcome.matched {
                info!(variant = %kind, path = %sibling.display(), "Skipping duplicate photo");
                report.record_duplicate_skipped();
                return Ok(VariantOutcome::Duplicate {
                    path: sibling,
                    method: sibling_outcome.method,
                });
            }

            warn!(
                variant = %kind,
                path = %sibling.display(),
                "Skipping due to hash mismatch with (1) duplicate"
            );
            return Ok(VariantOutcome::Unresolved { path: sibling });
        }

        info!(variant = %kind, path = %path.display(), "Exporting photo over differing file");
        library.export(photo, target)?;

        if sibling.exists() {
            info!(variant = %kind, path = %sibling.display(), "Duplicate created");
            report.record_duplicate_created();
            Ok(self.finish_export(photo, kind, sibling, true, report))
        } else {
            Ok(self.finish_export(photo, kind, path, false, report))
        }
    }

    fn finish_export(
        &self,
        photo: &PhotoRecord,
        kind: VariantKind,
        path: PathBuf,
        created_duplicate: bool,
        report: &mut Report,
    ) -> VariantOutcome {
        let timestamp_synced = match self.synchronizer.sync(&path, &photo.capture_date) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Failed to set timestamp, file might not have been written yet");
                report.record_timestamp_failure(FailedTimestampEntry {
                    path: path.clone(),
                    date: photo.capture_date,
                });
                false
            }
        };

        report.record_exported(kind);

        VariantOutcome::Exported {
            path,
            created_duplicate,
            timestamp_synced,
        }
    }
}
