//! # Library Module
//!
//! The photo library the export pipeline reads from.
//!
//! ## Design
//! The pipeline never talks to a concrete library. It receives a
//! [`LibrarySource`] that enumerates [`PhotoRecord`]s and exposes the
//! export primitive, so tests can drive it with an in-memory fake.
//!
//! ## Export Primitive Contract
//! `export` writes the requested variant's bytes to `target.path()`.
//! When that filename is already taken it must not overwrite; it writes
//! to a collision-suffixed sibling (`<stem> (1).<ext>`) instead. The
//! duplicate reconciler relies on this behavior.

mod folder;

pub use folder::FolderLibrary;

use crate::core::resolver::{ExportTarget, VariantKind};
use crate::error::LibraryError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One photo as reported by the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Library-unique identifier
    pub id: String,
    /// Capture date in the photo's local offset
    pub capture_date: DateTime<FixedOffset>,
    /// Filename as stored in the library
    pub original_filename: String,
    /// Whether an edited rendition exists
    pub has_adjustments: bool,
    /// Whether a motion companion clip exists
    pub is_live_photo: bool,
    /// Bytes of the unedited photo
    pub original_path: PathBuf,
    /// Bytes of the edited rendition
    pub edited_path: Option<PathBuf>,
    /// Bytes of the live companion clip
    pub live_path: Option<PathBuf>,
}

impl PhotoRecord {
    /// Source bytes an existing export of `kind` is compared against.
    ///
    /// Live variants without a known companion path compare against the
    /// original still.
    pub fn comparison_source(&self, kind: VariantKind) -> Result<&Path, LibraryError> {
        match kind {
            VariantKind::Original => Ok(&self.original_path),
            VariantKind::Edited => {
                self.edited_path
                    .as_deref()
                    .ok_or_else(|| LibraryError::MissingVariantSource {
                        photo_id: self.id.clone(),
                        variant: kind.to_string(),
                    })
            }
            VariantKind::Live => Ok(self.live_path.as_deref().unwrap_or(&self.original_path)),
        }
    }
}

/// Capability the pipeline needs from a photo library
pub trait LibrarySource {
    /// Enumerate all photos in library order
    fn photos(&self) -> Result<Vec<PhotoRecord>, LibraryError>;

    /// Write one variant of a photo to `target`, renaming on collision
    fn export(&self, photo: &PhotoRecord, target: &ExportTarget) -> Result<(), LibraryError>;
}
