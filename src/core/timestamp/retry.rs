//! Bounded polling for eventually-visible filesystem state.

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of probes, including the first
    pub max_attempts: u32,
    /// Pause between consecutive probes
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Run `probe` until it yields a value or attempts run out.
    ///
    /// The probe receives the 1-based attempt number. On success returns
    /// the value together with the attempt that produced it. Blocks the
    /// calling thread for `interval` between attempts.
    pub fn poll<T, F>(&self, mut probe: F) -> Option<(T, u32)>
    where
        F: FnMut(u32) -> Option<T>,
    {
        for attempt in 1..=self.max_attempts {
            if let Some(value) = probe(attempt) {
                return Some((value, attempt));
            }
            if attempt < self.max_attempts {
                thread::sleep(self.interval);
            }
        }
        None
    }
}

impl Default for RetryPolicy {
    /// Five probes one second apart
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}
