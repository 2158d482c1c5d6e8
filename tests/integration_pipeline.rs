//! Integration tests for the export pipeline.
//!
//! These tests drive the full pipeline against a fake library whose
//! export primitive behaves like the real one:
//! - writes the variant's bytes to the requested path
//! - writes to `<stem> (1).<ext>` instead when that path is taken

use assert_fs::prelude::*;
use assert_fs::TempDir;
use chrono::{DateTime, FixedOffset};
use filetime::FileTime;
use image::{DynamicImage, ImageBuffer, Rgb};
use photo_export::core::library::{LibrarySource, PhotoRecord};
use photo_export::core::pipeline::Pipeline;
use photo_export::core::resolver::{ExportTarget, VariantKind};
use photo_export::core::timestamp::RetryPolicy;
use photo_export::error::LibraryError;
use predicates::prelude::*;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

struct FakeLibrary {
    photos: Vec<PhotoRecord>,
    /// Photo ids whose export primitive fails
    failing: HashSet<String>,
    /// Variants the primitive claims to write but never does
    invisible: HashSet<VariantKind>,
    exports: RefCell<Vec<PathBuf>>,
}

impl FakeLibrary {
    fn new(photos: Vec<PhotoRecord>) -> Self {
        Self {
            photos,
            failing: HashSet::new(),
            invisible: HashSet::new(),
            exports: RefCell::new(Vec::new()),
        }
    }

    fn export_count(&self) -> usize {
        self.exports.borrow().len()
    }
}

impl LibrarySource for FakeLibrary {
    fn photos(&self) -> Result<Vec<PhotoRecord>, LibraryError> {
        Ok(self.photos.clone())
    }

    fn export(&self, photo: &PhotoRecord, target: &ExportTarget) -> Result<(), LibraryError> {
        let intended = target.path();
        self.exports.borrow_mut().push(intended.clone());

        if self.failing.contains(&photo.id) {
            return Err(LibraryError::ExportFailed {
                path: intended,
                source: io::Error::new(io::ErrorKind::Other, "volume went away"),
            });
        }
        if self.invisible.contains(&target.kind) {
            return Ok(());
        }

        let source = match target.kind {
            VariantKind::Original => photo.original_path.clone(),
            VariantKind::Edited => photo.edited_path.clone().unwrap(),
            VariantKind::Live => photo.live_path.clone().unwrap(),
        };
        let destination = if intended.exists() {
            target.collision_path()
        } else {
            intended
        };
        fs::copy(&source, &destination)
            .map(|_| ())
            .map_err(|e| LibraryError::ExportFailed {
                path: destination,
                source: e,
            })
    }
}

fn date(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn write_png(path: &Path, invert: bool) {
    let img = ImageBuffer::from_fn(64, 64, |x, y| {
        let value = ((x * 3 + y) % 256) as u8;
        let value = if invert { 255 - value } else { value };
        Rgb([value, value / 2, 255 - value])
    });
    DynamicImage::ImageRgb8(img).save(path).unwrap();
}

fn photo(library: &TempDir, id: &str, filename: &str, captured: &str) -> PhotoRecord {
    let original_path = library.child(filename).path().to_path_buf();
    PhotoRecord {
        id: id.to_string(),
        capture_date: date(captured),
        original_filename: filename.to_string(),
        has_adjustments: false,
        is_live_photo: false,
        original_path,
        edited_path: None,
        live_path: None,
    }
}

fn with_edit(mut record: PhotoRecord, library: &TempDir, bytes: &[u8]) -> PhotoRecord {
    let file = library.child(format!("edited-{}", record.original_filename));
    file.write_binary(bytes).unwrap();
    record.has_adjustments = true;
    record.edited_path = Some(file.path().to_path_buf());
    record
}

fn with_live(mut record: PhotoRecord, library: &TempDir, bytes: &[u8]) -> PhotoRecord {
    let file = library.child(format!("{}.mov", record.id));
    file.write_binary(bytes).unwrap();
    record.is_live_photo = true;
    record.live_path = Some(file.path().to_path_buf());
    record
}

fn pipeline(export: &TempDir) -> Pipeline {
    Pipeline::builder()
        .export_root(export.path())
        .retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
        .build()
        .unwrap()
}

#[test]
fn fresh_photo_lands_in_dated_folder_with_capture_mtime() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    library.child("IMG_0042.HEIC").write_binary(b"heic bytes").unwrap();

    let record = photo(&library, "42", "IMG_0042.HEIC", "2023-06-15T00:00:00+00:00");
    let fake = FakeLibrary::new(vec![record.clone()]);

    let result = pipeline(&export).run(&fake).unwrap();

    let exported = export.child("2023/06/IMG_0042.HEIC");
    exported.assert(predicate::path::is_file());
    assert_eq!(result.report.originals_exported(), 1);
    assert_eq!(result.report.duplicates_skipped(), 0);
    assert!(result.report.failed_timestamps().is_empty());

    let mtime = FileTime::from_last_modification_time(&fs::metadata(exported.path()).unwrap());
    assert_eq!(mtime.unix_seconds(), record.capture_date.timestamp());
}

#[test]
fn second_run_only_skips() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();

    write_png(library.child("IMG_0001.png").path(), false);
    library.child("IMG_0002.jpg").write_binary(b"not really a jpeg").unwrap();
    library.child("2024_IMG_0003_copy.heic").write_binary(b"heic").unwrap();

    let photos = vec![
        with_edit(
            photo(&library, "1", "IMG_0001.png", "2024-01-10T10:00:00+01:00"),
            &library,
            b"edited bytes",
        ),
        with_live(
            photo(&library, "2", "IMG_0002.jpg", "2024-02-11T10:00:00+01:00"),
            &library,
            b"clip bytes",
        ),
        photo(&library, "3", "2024_IMG_0003_copy.heic", "2024-02-12T10:00:00+01:00"),
    ];
    let fake = FakeLibrary::new(photos);
    let pipeline = pipeline(&export);

    let first = pipeline.run(&fake).unwrap();
    assert_eq!(first.report.originals_exported(), 3);
    assert_eq!(first.report.edits_exported(), 1);
    assert_eq!(first.report.live_photos_exported(), 1);
    assert_eq!(first.report.duplicates_skipped(), 0);
    export.child("2024/01/IMG_0001.png").assert(predicate::path::is_file());
    export.child("2024/01/IMG_0001-edited.png").assert(predicate::path::is_file());
    export.child("2024/02/IMG_0002_HEVC.MOV").assert(predicate::path::is_file());
    export.child("2024/02/IMG_0003.heic").assert(predicate::path::is_file());

    let exports_after_first = fake.export_count();
    let second = pipeline.run(&fake).unwrap();

    assert_eq!(second.report.total_exported(), 0);
    assert_eq!(second.report.duplicates_created(), 0);
    // Duplicate originals gate their edited and live variants
    assert_eq!(second.report.duplicates_skipped(), 3);
    assert_eq!(fake.export_count(), exports_after_first);
}

#[test]
fn collision_created_by_export_is_adopted_then_recognised() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    write_png(library.child("IMG_0100.png").path(), false);
    export.child("2024/03").create_dir_all().unwrap();
    write_png(export.child("2024/03/IMG_0100.png").path(), true);

    let record = photo(&library, "100", "IMG_0100.png", "2024-03-05T08:00:00+00:00");
    let fake = FakeLibrary::new(vec![record]);
    let pipeline = pipeline(&export);

    let first = pipeline.run(&fake).unwrap();
    assert_eq!(first.report.originals_exported(), 1);
    assert_eq!(first.report.duplicates_created(), 1);
    let sibling = export.child("2024/03/IMG_0100 (1).png");
    sibling.assert(predicate::path::is_file());

    let second = pipeline.run(&fake).unwrap();
    assert_eq!(second.report.total_exported(), 0);
    assert_eq!(second.report.duplicates_skipped(), 1);
    export
        .child("2024/03/IMG_0100 (2).png")
        .assert(predicate::path::missing());
}

#[test]
fn unresolved_original_does_not_block_other_variants() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    library.child("IMG_0200.jpg").write_binary(b"source").unwrap();
    export.child("2024/04/IMG_0200.jpg").write_binary(b"other").unwrap();
    export.child("2024/04/IMG_0200 (1).jpg").write_binary(b"third").unwrap();

    let record = with_live(
        photo(&library, "200", "IMG_0200.jpg", "2024-04-01T12:00:00+00:00"),
        &library,
        b"clip",
    );
    let fake = FakeLibrary::new(vec![record]);

    let result = pipeline(&export).run(&fake).unwrap();

    assert_eq!(result.report.originals_exported(), 0);
    assert_eq!(result.report.duplicates_skipped(), 0);
    assert_eq!(result.report.live_photos_exported(), 1);
    export
        .child("2024/04/IMG_0200.jpg")
        .assert(predicate::path::is_file());
    export
        .child("2024/04/IMG_0200_HEVC.MOV")
        .assert(predicate::path::is_file());
}

#[test]
fn edited_duplicate_does_not_gate_live_variant() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    library.child("IMG_0300.jpg").write_binary(b"original").unwrap();
    export
        .child("2024/05/IMG_0300-edited.jpg")
        .write_binary(b"edited")
        .unwrap();

    let record = with_live(
        with_edit(
            photo(&library, "300", "IMG_0300.jpg", "2024-05-20T12:00:00+00:00"),
            &library,
            b"edited",
        ),
        &library,
        b"clip",
    );
    let fake = FakeLibrary::new(vec![record]);

    let result = pipeline(&export).run(&fake).unwrap();

    assert_eq!(result.report.originals_exported(), 1);
    assert_eq!(result.report.edits_exported(), 0);
    assert_eq!(result.report.duplicates_skipped(), 1);
    assert_eq!(result.report.live_photos_exported(), 1);
}

#[test]
fn export_failure_abandons_only_that_photo() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    library.child("IMG_0401.jpg").write_binary(b"one").unwrap();
    library.child("IMG_0402.jpg").write_binary(b"two").unwrap();

    let mut fake = FakeLibrary::new(vec![
        photo(&library, "401", "IMG_0401.jpg", "2024-06-01T12:00:00+00:00"),
        photo(&library, "402", "IMG_0402.jpg", "2024-06-02T12:00:00+00:00"),
    ]);
    fake.failing.insert("401".to_string());

    let result = pipeline(&export).run(&fake).unwrap();

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("IMG_0401.jpg"));
    assert_eq!(result.report.originals_exported(), 1);
    export
        .child("2024/06/IMG_0402.jpg")
        .assert(predicate::path::is_file());
}

#[test]
fn invisible_export_is_counted_and_reported() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    library.child("IMG_0500.jpg").write_binary(b"still").unwrap();

    let record = with_live(
        photo(&library, "500", "IMG_0500.jpg", "2024-07-04T12:00:00-04:00"),
        &library,
        b"clip",
    );
    let mut fake = FakeLibrary::new(vec![record.clone()]);
    fake.invisible.insert(VariantKind::Live);

    let result = pipeline(&export).run(&fake).unwrap();

    assert_eq!(result.report.originals_exported(), 1);
    assert_eq!(result.report.live_photos_exported(), 1);
    let failures = result.report.failed_timestamps();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].path,
        export.child("2024/07/IMG_0500_HEVC.MOV").path()
    );
    assert_eq!(failures[0].date, record.capture_date);
    assert!(result.report.to_string().contains("IMG_0500_HEVC.MOV"));
}

#[test]
fn photos_before_window_are_ignored() {
    let library = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    library.child("IMG_0600.jpg").write_binary(b"old").unwrap();
    library.child("IMG_0601.jpg").write_binary(b"new").unwrap();

    let fake = FakeLibrary::new(vec![
        photo(&library, "600", "IMG_0600.jpg", "2020-01-01T12:00:00+00:00"),
        photo(&library, "601", "IMG_0601.jpg", "2024-08-01T12:00:00+00:00"),
    ]);

    let pipeline = Pipeline::builder()
        .export_root(export.path())
        .since(chrono::NaiveDate::from_ymd_opt(2024, 1, 1))
        .retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
        .build()
        .unwrap();
    let result = pipeline.run(&fake).unwrap();

    assert_eq!(result.total_photos, 1);
    assert_eq!(result.report.originals_exported(), 1);
    export.child("2020").assert(predicate::path::missing());
}
