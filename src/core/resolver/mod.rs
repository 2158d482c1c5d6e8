//! # Resolver Module
//!
//! Works out where each variant of a photo belongs in the export tree.
//!
//! ## Layout
//! `<export root>/<year>/<month, 2 digits>/<filename>`
//!
//! ## Filenames
//! - **Original** - the library filename, canonicalized to `IMG_1234.<ext>`
//!   when an `IMG_` + 4 digit run appears in a `.jpg`/`.heic` name
//! - **Edited** - `<canonical stem>-edited.<ext>`
//! - **Live** - `<canonical stem>_HEVC.MOV`
//!
//! A collision sibling (`<stem> (1).<ext>`) is what the export primitive
//! writes when the intended filename is already taken.

use crate::core::library::PhotoRecord;
use crate::error::PhotoExportError;
use chrono::{DateTime, Datelike, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CANONICAL_NAME: OnceLock<Regex> = OnceLock::new();
static IMG_RUN: OnceLock<Regex> = OnceLock::new();

/// The distinct exportable representations of a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    Original,
    Edited,
    Live,
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantKind::Original => write!(f, "original"),
            VariantKind::Edited => write!(f, "edited"),
            VariantKind::Live => write!(f, "live"),
        }
    }
}

/// Where one variant of one photo should land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTarget {
    pub directory: PathBuf,
    pub filename: String,
    pub kind: VariantKind,
}

impl ExportTarget {
    /// Full path of the intended file
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Path the export primitive falls back to when `path()` is taken
    pub fn collision_path(&self) -> PathBuf {
        collision_sibling(&self.path())
    }
}

/// Maps photo metadata onto the export tree
#[derive(Debug, Clone)]
pub struct PathResolver {
    export_root: PathBuf,
}

impl PathResolver {
    pub fn new(export_root: impl Into<PathBuf>) -> Self {
        Self {
            export_root: export_root.into(),
        }
    }

    pub fn export_root(&self) -> &Path {
        &self.export_root
    }

    /// `<root>/<yyyy>/<mm>` for a capture date, in the date's own offset
    pub fn directory_for<Tz: TimeZone>(&self, capture_date: &DateTime<Tz>) -> PathBuf {
        self.export_root
            .join(capture_date.year().to_string())
            .join(format!("{:02}", capture_date.month()))
    }

    /// Create the year/month directory for a photo if it is missing
    pub fn ensure_directory(&self, photo: &PhotoRecord) -> Result<PathBuf, PhotoExportError> {
        let directory = self.directory_for(&photo.capture_date);
        fs::create_dir_all(&directory).map_err(|e| PhotoExportError::Io {
            path: directory.clone(),
            source: e,
        })?;
        Ok(directory)
    }

    /// Resolve the destination of one variant
    pub fn resolve(&self, photo: &PhotoRecord, kind: VariantKind) -> ExportTarget {
        let original = canonical_filename(&photo.original_filename);
        let filename = match kind {
            VariantKind::Original => original,
            VariantKind::Edited => edited_filename(&original),
            VariantKind::Live => live_filename(&original),
        };

        ExportTarget {
            directory: self.directory_for(&photo.capture_date),
            filename,
            kind,
        }
    }
}

/// Canonicalize a `.jpg`/`.heic` filename to its `IMG_1234` form.
///
/// Names already shaped like `IMG_1234.jpg` (any case) are kept, names
/// containing an `IMG_1234` run are reduced to that run plus the original
/// extension, everything else passes through untouched.
pub fn canonical_filename(filename: &str) -> String {
    let lower = filename.to_lowercase();
    if !(lower.ends_with(".jpg") || lower.ends_with(".heic")) {
        return filename.to_string();
    }

    let canonical = CANONICAL_NAME.get_or_init(|| {
        Regex::new(r"(?i)^IMG_\d{4}\.(jpg|heic)$").expect("canonical filename pattern is valid")
    });
    if canonical.is_match(filename) {
        return filename.to_string();
    }

    let img_run = IMG_RUN.get_or_init(|| Regex::new(r"IMG_\d{4}").expect("IMG run pattern is valid"));
    match img_run.find(filename) {
        Some(found) => {
            let (_, extension) = split_extension(filename);
            format!("{}{}", found.as_str(), extension)
        }
        None => filename.to_string(),
    }
}

/// `IMG_1234.heic` -> `IMG_1234-edited.heic`
pub fn edited_filename(canonical: &str) -> String {
    let (stem, extension) = split_extension(canonical);
    format!("{}-edited{}", stem, extension)
}

/// `IMG_1234.heic` -> `IMG_1234_HEVC.MOV`
pub fn live_filename(canonical: &str) -> String {
    let (stem, _) = split_extension(canonical);
    format!("{}_HEVC.MOV", stem)
}

/// `IMG_1234.jpg` -> `IMG_1234 (1).jpg`
pub fn collision_filename(filename: &str) -> String {
    let (stem, extension) = split_extension(filename);
    format!("{} (1){}", stem, extension)
}

/// Sibling of `path` named by [`collision_filename`]
pub fn collision_sibling(path: &Path) -> PathBuf {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(collision_filename(&filename))
}

/// Split at the final dot, keeping the dot on the extension.
///
/// A leading dot does not start an extension.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(index) if index > 0 => filename.split_at(index),
        _ => (filename, ""),
    }
}
