//! # Pipeline Module
//!
//! Drives a full export run.
//!
//! ## Per-Photo Stages
//! 1. **Filter** - skip photos captured before the configured window
//! 2. **Resolve** - create `<root>/<year>/<month>` and derive filenames
//! 3. **Reconcile** - original first, then edited and live variants
//!    unless the original turned out to be a duplicate
//! 4. **Report** - fold every outcome into the run's [`Report`]
//!
//! ## Concurrency
//! Strictly sequential. The report is a plain value owned by the run.
//!
//! [`Report`]: crate::core::report::Report

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
