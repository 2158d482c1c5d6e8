//! Perceptual Hash (pHash) implementation.
//!
//! pHash runs a Discrete Cosine Transform over a downscaled grayscale
//! copy of the image and keeps the sign of each low-frequency
//! coefficient relative to the mean. Re-encodes of the same picture
//! land on the same fingerprint, while pixel-level edits usually do not.
//!
//! The transform comes from the image_hasher crate.

use super::fast_decode::FastDecoder;
use super::traits::ImageHashValue;
use crate::error::CompareError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};
use std::path::Path;

/// Default fingerprint edge length (8x8 = 64 bits)
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// DCT-based perceptual hasher
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a new pHash hasher producing `hash_size * hash_size` bits
    pub fn new(hash_size: u32) -> Self {
        let hasher = HasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }

    /// Fingerprint an already-decoded image
    pub fn hash_image(&self, image: &DynamicImage) -> ImageHashValue {
        let hash = self.hasher.hash_image(image);
        ImageHashValue::new(hash.as_bytes().to_vec())
    }

    /// Decode a file and fingerprint it
    pub fn hash_file(&self, path: &Path) -> Result<ImageHashValue, CompareError> {
        let image = FastDecoder::decode(path)?;
        Ok(self.hash_image(&image))
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SIZE)
    }
}
