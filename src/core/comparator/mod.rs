//! # Comparator Module
//!
//! Decides whether a source photo and an existing export hold the same
//! content.
//!
//! ## How It Works
//! 1. If either extension is outside the perceptual set
//!    (jpg, jpeg, png, bmp, tiff, gif, heic, avif), compare SHA-256 digests
//! 2. Otherwise decode both images and compare their pHash fingerprints
//! 3. If decoding fails for any reason, fall back to SHA-256 digests
//!
//! Fingerprints must be equal bit for bit. The Hamming distance is logged
//! on a mismatch but never used as a tolerance.

mod traits;

pub use traits::FileComparator;

use crate::core::hasher::{
    content_digest, ImageFormat, ImageHashValue, PerceptualHasher, DEFAULT_HASH_SIZE,
};
use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// How a comparison verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonMethod {
    /// pHash fingerprints of the decoded images
    Perceptual,
    /// SHA-256 of the raw bytes
    ContentHash,
}

impl std::fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonMethod::Perceptual => write!(f, "perceptual hash"),
            ComparisonMethod::ContentHash => write!(f, "content hash"),
        }
    }
}

/// Verdict of a comparison plus the method that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub matched: bool,
    pub method: ComparisonMethod,
}

impl ComparisonOutcome {
    fn perceptual(matched: bool) -> Self {
        Self {
            matched,
            method: ComparisonMethod::Perceptual,
        }
    }

    fn content(matched: bool) -> Self {
        Self {
            matched,
            method: ComparisonMethod::ContentHash,
        }
    }
}

/// Perceptual comparator with a byte-exact fallback
pub struct ContentComparator {
    hasher: PerceptualHasher,
}

impl ContentComparator {
    /// Create a comparator using `hash_size * hash_size` bit fingerprints
    pub fn new(hash_size: u32) -> Self {
        Self {
            hasher: PerceptualHasher::new(hash_size),
        }
    }

    fn compare_perceptual(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        let hash_a = self.hasher.hash_file(a)?;
        let hash_b = self.hasher.hash_file(b)?;

        let matched = fingerprints_match(&hash_a, &hash_b);
        if !matched {
            debug!(
                a = %a.display(),
                b = %b.display(),
                distance = hash_a.distance(&hash_b),
                "Perceptual fingerprints differ"
            );
        }
        Ok(matched)
    }

    fn compare_content(a: &Path, b: &Path) -> Result<bool, CompareError> {
        // Files of different length can never share a digest
        if let (Ok(meta_a), Ok(meta_b)) = (fs::metadata(a), fs::metadata(b)) {
            if meta_a.len() != meta_b.len() {
                return Ok(false);
            }
        }
        Ok(content_digest(a)? == content_digest(b)?)
    }
}

/// Every bit must agree; there is no distance tolerance
fn fingerprints_match(a: &ImageHashValue, b: &ImageHashValue) -> bool {
    a == b
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SIZE)
    }
}

impl FileComparator for ContentComparator {
    fn compare(&self, a: &Path, b: &Path) -> Result<ComparisonOutcome, CompareError> {
        if ImageFormat::from_path(a).is_none() || ImageFormat::from_path(b).is_none() {
            return Self::compare_content(a, b).map(ComparisonOutcome::content);
        }

        match self.compare_perceptual(a, b) {
            Ok(matched) => Ok(ComparisonOutcome::perceptual(matched)),
            Err(CompareError::Decode { path, reason }) => {
                debug!(path = %path.display(), %reason, "Not decodable, comparing bytes instead");
                Self::compare_content(a, b).map(ComparisonOutcome::content)
            }
            Err(e) => {
                warn!(a = %a.display(), b = %b.display(), error = %e, "Error processing files");
                Self::compare_content(a, b).map(ComparisonOutcome::content)
            }
        }
    }
}
