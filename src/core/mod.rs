//! # Core Module
//!
//! The UI-agnostic export reconciliation engine.
//!
//! ## Modules
//! - `hasher` - Decodes images and computes fingerprints and digests
//! - `comparator` - Decides whether two files hold the same content
//! - `resolver` - Maps photos to paths in the export tree
//! - `reconciler` - Export / skip / adopt-sibling decision per variant
//! - `timestamp` - Applies capture dates to exported files
//! - `report` - Run counters and timestamp failures
//! - `library` - Photo library capability and a folder-backed source
//! - `pipeline` - Orchestrates the full run

pub mod comparator;
pub mod hasher;
pub mod library;
pub mod pipeline;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod timestamp;

// Re-export commonly used types
pub use comparator::{ComparisonMethod, ComparisonOutcome, ContentComparator, FileComparator};
pub use library::{FolderLibrary, LibrarySource, PhotoRecord};
pub use pipeline::{Pipeline, PipelineResult};
pub use reconciler::VariantOutcome;
pub use report::{FailedTimestampEntry, Report};
pub use resolver::{ExportTarget, PathResolver, VariantKind};
pub use timestamp::RetryPolicy;
