//! # Hasher Module
//!
//! Computes the two kinds of fingerprint used to recognise an export that
//! already exists.
//!
//! ## Fingerprints
//! - **pHash (Perceptual Hash)** - DCT-based, survives re-encoding of the
//!   same picture
//! - **SHA-256 content digest** - exact bytes, used for every format the
//!   decoder cannot handle
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Streams file bytes into the digest instead of buffering whole files
//!
//! ## Example
//! ```rust,ignore
//! use photo_export::core::hasher::{content_digest, PerceptualHasher};
//!
//! let hasher = PerceptualHasher::default();
//! let fingerprint = hasher.hash_file(&path)?;
//! let digest = content_digest(&path)?;
//! ```

mod content;
pub mod fast_decode;
mod perceptual;
mod traits;

pub use content::content_digest;
pub use fast_decode::{FastDecoder, ImageFormat};
pub use perceptual::{PerceptualHasher, DEFAULT_HASH_SIZE};
pub use traits::{ContentDigest, ImageHashValue};
