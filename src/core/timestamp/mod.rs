//! # Timestamp Module
//!
//! Stamps the capture date onto freshly exported files.
//!
//! Exports to network volumes can take a moment to become visible, so the
//! synchronizer polls for the file with a bounded [`RetryPolicy`] before
//! setting its access and modification times.

mod retry;

pub use retry::RetryPolicy;

use crate::error::TimestampError;
use chrono::{DateTime, TimeZone};
use filetime::FileTime;
use std::path::Path;
use tracing::debug;

/// Sets file times to a photo's capture date
#[derive(Debug, Clone, Default)]
pub struct TimestampSynchronizer {
    policy: RetryPolicy,
}

impl TimestampSynchronizer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wait for `path` to appear, then set its atime and mtime.
    ///
    /// Returns the number of polling attempts used.
    pub fn sync<Tz: TimeZone>(
        &self,
        path: &Path,
        capture_date: &DateTime<Tz>,
    ) -> Result<u32, TimestampError> {
        let stamp = FileTime::from_unix_time(
            capture_date.timestamp(),
            capture_date.timestamp_subsec_nanos(),
        );

        let polled = self.policy.poll(|_| {
            path.exists()
                .then(|| filetime::set_file_times(path, stamp, stamp))
        });

        match polled {
            Some((Ok(()), attempts)) => {
                debug!(path = %path.display(), attempts, "Timestamp set");
                Ok(attempts)
            }
            Some((Err(source), _)) => Err(TimestampError::SetFailed {
                path: path.to_path_buf(),
                source,
            }),
            None => Err(TimestampError::NotVisible {
                path: path.to_path_buf(),
                attempts: self.policy.max_attempts,
            }),
        }
    }
}
