//! Event type definitions for progress reporting.

use crate::core::comparator::ComparisonMethod;
use crate::core::resolver::VariantKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the export pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Run-level events
    Pipeline(PipelineEvent),
    /// Per-photo events
    Photo(PhotoEvent),
    /// Per-variant outcomes
    Variant(VariantEvent),
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Photos have been enumerated and filtered
    Started { total_photos: usize },
    /// Every photo has been visited
    Completed { summary: PipelineSummary },
    /// The library could not be enumerated
    Error { message: String },
}

/// Per-photo events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PhotoEvent {
    /// A photo is about to be reconciled
    Started {
        /// 1-based position in the filtered photo list
        index: usize,
        total: usize,
        filename: String,
    },
    /// The photo was abandoned; the run continues with the next one
    Failed { filename: String, message: String },
}

/// Terminal state of one variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VariantEvent {
    Exported {
        kind: VariantKind,
        path: PathBuf,
        created_duplicate: bool,
        timestamp_synced: bool,
    },
    DuplicateSkipped {
        kind: VariantKind,
        path: PathBuf,
        method: ComparisonMethod,
    },
    Unresolved { kind: VariantKind, path: PathBuf },
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Photos that passed the date filter
    pub total_photos: usize,
    /// Variants exported, any kind
    pub exported: u64,
    pub duplicates_skipped: u64,
    pub duplicates_created: u64,
    pub timestamp_failures: usize,
    /// Photos abandoned because of an error
    pub failed_photos: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Variant(VariantEvent::DuplicateSkipped {
            kind: VariantKind::Edited,
            path: PathBuf::from("/export/2024/01/IMG_0001-edited.jpg"),
            method: ComparisonMethod::Perceptual,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Variant(VariantEvent::DuplicateSkipped { kind, method, .. }) => {
                assert_eq!(kind, VariantKind::Edited);
                assert_eq!(method, ComparisonMethod::Perceptual);
            }
            _ => panic!("Wrong event type"),
        }
    }
}
