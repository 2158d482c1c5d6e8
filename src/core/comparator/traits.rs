//! Trait definitions for file comparison.

use super::ComparisonOutcome;
use crate::error::CompareError;
use std::path::Path;

/// Decides whether two files on disk hold the same content
///
/// Implement this trait to swap the comparison policy (e.g., for testing).
pub trait FileComparator: Send + Sync {
    /// Compare two files and report how the decision was reached
    fn compare(&self, a: &Path, b: &Path) -> Result<ComparisonOutcome, CompareError>;

    /// Convenience wrapper returning only the verdict
    fn matches(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        self.compare(a, b).map(|outcome| outcome.matched)
    }
}
