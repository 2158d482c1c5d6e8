//! # Photo Export
//!
//! Exports a photo library into a `<year>/<month>` tree without ever
//! writing the same picture twice.
//!
//! ## Core Philosophy
//! - **Never overwrite** - an existing file is compared, never replaced
//! - **Re-runnable** - a second run over the same library only skips
//! - **Keep going** - per-file problems are reported, not fatal
//!
//! ## Architecture
//! - `core` - The reconciliation engine
//! - `events` - Event-driven progress reporting
//! - `error` - Typed error taxonomy
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PhotoExportError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `default_filter`
/// applies when `RUST_LOG` is not set.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
