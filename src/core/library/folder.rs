//! Library source backed by a plain directory tree.
//!
//! - Photos: files with an image extension, excluding `-edited` renditions
//! - Edited rendition: sibling `<stem>-edited.<ext>`
//! - Live companion: sibling `<stem>.mov` (any case)
//! - Capture date: EXIF `DateTimeOriginal`, else file modification time

use super::{LibrarySource, PhotoRecord};
use crate::core::resolver::{ExportTarget, VariantKind};
use crate::error::LibraryError;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "heif", "tiff", "tif", "gif", "bmp", "avif", "webp",
];

/// A directory of photos acting as a library
pub struct FolderLibrary {
    root: PathBuf,
}

impl FolderLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_photo(path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if !PHOTO_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return false;
        }
        !path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with("-edited"))
    }

    fn record_for(&self, path: &Path, index: &HashMap<String, PathBuf>) -> Option<PhotoRecord> {
        let filename = path.file_name()?.to_str()?.to_string();
        let stem = path.file_stem()?.to_str()?;
        let parent = path.parent()?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

        let lookup = |name: String| index.get(&lookup_key(&parent.join(name))).cloned();
        let edited_path = lookup(format!("{}-edited.{}", stem, ext));
        let live_path = lookup(format!("{}.mov", stem));

        let capture_date = capture_date(path)?;
        let id = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string();

        Some(PhotoRecord {
            id,
            capture_date,
            original_filename: filename,
            has_adjustments: edited_path.is_some(),
            is_live_photo: live_path.is_some(),
            original_path: path.to_path_buf(),
            edited_path,
            live_path,
        })
    }
}

impl LibrarySource for FolderLibrary {
    fn photos(&self) -> Result<Vec<PhotoRecord>, LibraryError> {
        if !self.root.is_dir() {
            return Err(LibraryError::SourceNotFound {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| LibraryError::Read {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
                source: e.into(),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        let index: HashMap<String, PathBuf> = files
            .iter()
            .map(|path| (lookup_key(path), path.clone()))
            .collect();

        Ok(files
            .iter()
            .filter(|path| Self::is_photo(path))
            .filter_map(|path| {
                let record = self.record_for(path, &index);
                if record.is_none() {
                    warn!(
                        path = %path.display(),
                        "Skipping photo without a UTF-8 name or capture date"
                    );
                }
                record
            })
            .collect())
    }

    fn export(&self, photo: &PhotoRecord, target: &ExportTarget) -> Result<(), LibraryError> {
        let source = match target.kind {
            VariantKind::Original => Some(photo.original_path.as_path()),
            VariantKind::Edited => photo.edited_path.as_deref(),
            VariantKind::Live => photo.live_path.as_deref(),
        }
        .ok_or_else(|| LibraryError::MissingVariantSource {
            photo_id: photo.id.clone(),
            variant: target.kind.to_string(),
        })?;

        let destination = free_destination(target);
        fs::copy(source, &destination).map_err(|e| LibraryError::ExportFailed {
            path: destination.clone(),
            source: e,
        })?;
        debug!(from = %source.display(), to = %destination.display(), "Copied variant");
        Ok(())
    }
}

/// First of `name.ext`, `name (1).ext`, `name (2).ext`, ... not yet on disk
fn free_destination(target: &ExportTarget) -> PathBuf {
    let intended = target.path();
    if !intended.exists() {
        return intended;
    }

    let (stem, extension) = match target.filename.rfind('.') {
        Some(index) if index > 0 => target.filename.split_at(index),
        _ => (target.filename.as_str(), ""),
    };

    (1..)
        .map(|n| target.directory.join(format!("{} ({}){}", stem, n, extension)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(intended)
}

fn lookup_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

fn capture_date(path: &Path) -> Option<DateTime<FixedOffset>> {
    exif_capture_date(path).or_else(|| {
        let modified = fs::metadata(path).ok()?.modified().ok()?;
        Some(DateTime::<Local>::from(modified).fixed_offset())
    })
}

fn exif_capture_date(path: &Path) -> Option<DateTime<FixedOffset>> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    let field = exif
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .or_else(|| exif.get_field(exif::Tag::DateTime, exif::In::PRIMARY))?;
    let exif::Value::Ascii(ref values) = field.value else {
        return None;
    };
    let mut stamp = exif::DateTime::from_ascii(values.first()?).ok()?;

    if let Some(offset) = exif.get_field(exif::Tag::OffsetTimeOriginal, exif::In::PRIMARY) {
        if let exif::Value::Ascii(ref values) = offset.value {
            if let Some(raw) = values.first() {
                apply_offset(&mut stamp, raw, path);
            }
        }
    }

    let naive = NaiveDate::from_ymd_opt(stamp.year.into(), stamp.month.into(), stamp.day.into())?
        .and_hms_opt(stamp.hour.into(), stamp.minute.into(), stamp.second.into())?;

    let date = match stamp.offset {
        Some(minutes) => FixedOffset::east_opt(i32::from(minutes) * 60)?
            .from_local_datetime(&naive)
            .single()?,
        None => Local.from_local_datetime(&naive).earliest()?.fixed_offset(),
    };
    Some(date)
}

/// A malformed offset leaves the stamp in local time
fn apply_offset(stamp: &mut exif::DateTime, raw: &[u8], path: &Path) {
    if let Err(e) = stamp.parse_offset(raw) {
        debug!(
            path = %path.display(),
            offset = %String::from_utf8_lossy(raw),
            error = %e,
            "Ignoring malformed OffsetTimeOriginal"
        );
    }
}
