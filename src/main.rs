//! # photo-export CLI
//!
//! Command-line interface for the photo export reconciler.
//!
//! ## Usage
//! ```bash
//! photo-export run --source ~/Pictures/Library --dest /Volumes/Archive/Photos
//! photo-export run --source ./library --dest ./export --all --output json
//! ```

mod cli;

use photo_export::Result;

fn main() -> Result<()> {
    cli::run()
}
