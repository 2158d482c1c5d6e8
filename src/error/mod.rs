//! # Error Module
//!
//! Typed errors for the export pipeline.
//!
//! ## Recovery Policy
//! - **Compare** - decode failures never leave the comparator; only an
//!   unreadable file reaches the caller
//! - **Timestamp** - recorded in the report failure list, the run continues
//! - **Library** - export-primitive failures abort the current photo only
//! - **Io** - destination directory problems abort the current photo only

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PhotoExportError {
    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while deciding whether two files hold the same content
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while stamping the capture date onto an exported file
#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("{path} still does not exist after {attempts} checks")]
    NotVisible { path: PathBuf, attempts: u32 },

    #[error("Failed to set file times on {path}: {source}")]
    SetFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a library source or its export primitive
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Library not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Photo {photo_id} has no source bytes for the {variant} variant")]
    MissingVariantSource { photo_id: String, variant: String },

    #[error("Failed to read library entry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export to {path} failed: {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PhotoExportError>;
