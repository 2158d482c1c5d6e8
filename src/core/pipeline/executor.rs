//! Pipeline execution implementation.

use crate::core::comparator::{ContentComparator, FileComparator};
use crate::core::hasher::DEFAULT_HASH_SIZE;
use crate::core::library::{LibrarySource, PhotoRecord};
use crate::core::reconciler::{DuplicateReconciler, VariantOutcome};
use crate::core::report::Report;
use crate::core::resolver::{PathResolver, VariantKind};
use crate::core::timestamp::{RetryPolicy, TimestampSynchronizer};
use crate::error::PhotoExportError;
use crate::events::{
    null_sender, Event, EventSender, PhotoEvent, PipelineEvent, PipelineSummary, VariantEvent,
};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Counters and timestamp failures
    pub report: Report,
    /// Photos that passed the date filter
    pub total_photos: usize,
    /// One message per abandoned photo (non-fatal)
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the year/month export tree
    pub export_root: PathBuf,
    /// Only photos captured on or after this date are processed
    pub since: Option<NaiveDate>,
    /// Polling used while waiting for exported files to appear
    pub retry: RetryPolicy,
    /// Perceptual fingerprint edge length
    pub hash_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            export_root: PathBuf::new(),
            since: None,
            retry: RetryPolicy::default(),
            hash_size: DEFAULT_HASH_SIZE,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    comparator: Option<Box<dyn FileComparator>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            comparator: None,
        }
    }

    /// Set the export tree root
    pub fn export_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.export_root = root.into();
        self
    }

    /// Skip photos captured before `date`
    pub fn since(mut self, date: Option<NaiveDate>) -> Self {
        self.config.since = date;
        self
    }

    /// Set the visibility polling policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set the perceptual fingerprint edge length
    pub fn hash_size(mut self, size: u32) -> Self {
        self.config.hash_size = size;
        self
    }

    /// Replace the default content comparator
    pub fn comparator(mut self, comparator: Box<dyn FileComparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline, PhotoExportError> {
        if self.config.export_root.as_os_str().is_empty() {
            return Err(PhotoExportError::Config("export root is not set".to_string()));
        }
        if self.config.retry.max_attempts == 0 {
            return Err(PhotoExportError::Config(
                "retry policy needs at least one attempt".to_string(),
            ));
        }
        if self.config.hash_size == 0 {
            return Err(PhotoExportError::Config(
                "perceptual hash size must be at least 1".to_string(),
            ));
        }

        let comparator = self
            .comparator
            .unwrap_or_else(|| Box::new(ContentComparator::new(self.config.hash_size)));
        let synchronizer = TimestampSynchronizer::new(self.config.retry);

        Ok(Pipeline {
            resolver: PathResolver::new(self.config.export_root.clone()),
            reconciler: DuplicateReconciler::new(comparator, synchronizer),
            config: self.config,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The export reconciliation pipeline
///
/// Photos are processed one at a time in library order, variants one at
/// a time within a photo.
pub struct Pipeline {
    config: PipelineConfig,
    resolver: PathResolver,
    reconciler: DuplicateReconciler,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self, library: &dyn LibrarySource) -> Result<PipelineResult, PhotoExportError> {
        self.run_with_events(library, &null_sender())
    }

    /// Run the pipeline with event reporting
    ///
    /// Only a failure to enumerate the library is returned as an error;
    /// per-photo failures are collected in [`PipelineResult::errors`].
    pub fn run_with_events(
        &self,
        library: &dyn LibrarySource,
        events: &EventSender,
    ) -> Result<PipelineResult, PhotoExportError> {
        let start_time = Instant::now();

        let photos = match library.photos() {
            Ok(photos) => photos,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        let photos: Vec<PhotoRecord> = photos
            .into_iter()
            .filter(|photo| self.in_window(photo))
            .collect();
        let total_photos = photos.len();

        match self.config.since {
            Some(since) => info!(total_photos, %since, "Found photos to process"),
            None => info!(total_photos, "Found photos to process"),
        }
        events.send(Event::Pipeline(PipelineEvent::Started { total_photos }));

        let mut report = Report::new();
        let mut errors = Vec::new();

        for (index, photo) in photos.iter().enumerate() {
            events.send(Event::Photo(PhotoEvent::Started {
                index: index + 1,
                total: total_photos,
                filename: photo.original_filename.clone(),
            }));

            if let Err(e) = self.process_photo(library, photo, &mut report, events) {
                warn!(photo = %photo.original_filename, error = %e, "Error exporting photo");
                events.send(Event::Photo(PhotoEvent::Failed {
                    filename: photo.original_filename.clone(),
                    message: e.to_string(),
                }));
                errors.push(format!("{}: {}", photo.original_filename, e));
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_photos,
                exported: report.total_exported(),
                duplicates_skipped: report.duplicates_skipped(),
                duplicates_created: report.duplicates_created(),
                timestamp_failures: report.failed_timestamps().len(),
                failed_photos: errors.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            report,
            total_photos,
            errors,
            duration_ms,
        })
    }

    fn in_window(&self, photo: &PhotoRecord) -> bool {
        self.config
            .since
            .map_or(true, |since| photo.capture_date.date_naive() >= since)
    }

    /// Original first; a duplicate original ends the photo
    fn process_photo(
        &self,
        library: &dyn LibrarySource,
        photo: &PhotoRecord,
        report: &mut Report,
        events: &EventSender,
    ) -> Result<(), PhotoExportError> {
        self.resolver.ensure_directory(photo)?;

        let original = self.export_variant(library, photo, VariantKind::Original, report, events)?;
        if original.is_duplicate() {
            return Ok(());
        }

        if photo.has_adjustments {
            self.export_variant(library, photo, VariantKind::Edited, report, events)?;
        }
        if photo.is_live_photo {
            self.export_variant(library, photo, VariantKind::Live, report, events)?;
        }
        Ok(())
    }

    fn export_variant(
        &self,
        library: &dyn LibrarySource,
        photo: &PhotoRecord,
        kind: VariantKind,
        report: &mut Report,
        events: &EventSender,
    ) -> Result<VariantOutcome, PhotoExportError> {
        let target = self.resolver.resolve(photo, kind);
        let outcome = self.reconciler.reconcile(library, photo, &target, report)?;
        events.send(Event::Variant(variant_event(kind, &outcome)));
        Ok(outcome)
    }
}

fn variant_event(kind: VariantKind, outcome: &VariantOutcome) -> VariantEvent {
    match outcome {
        VariantOutcome::Exported {
            path,
            created_duplicate,
            timestamp_synced,
        } => VariantEvent::Exported {
            kind,
            path: path.clone(),
            created_duplicate: *created_duplicate,
            timestamp_synced: *timestamp_synced,
        },
        VariantOutcome::Duplicate { path, method } => VariantEvent::DuplicateSkipped {
            kind,
            path: path.clone(),
            method: *method,
        },
        VariantOutcome::Unresolved { path } => VariantEvent::Unresolved {
            kind,
            path: path.clone(),
        },
    }
}
