//! Fingerprint value types.

use serde::{Deserialize, Serialize};

/// A perceptual fingerprint
///
/// Two fingerprints are equal only when every bit agrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHashValue {
    bytes: Vec<u8>,
}

impl ImageHashValue {
    /// Create a new hash value
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the raw hash bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of differing bits between two fingerprints.
    ///
    /// Only logged for diagnostics; matching never thresholds on it.
    pub fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Get the hash as a hexadecimal string
    pub fn to_hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

/// A SHA-256 digest of a file's full byte stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap a finished digest
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
