//! Byte-exact content digest.

use super::traits::ContentDigest;
use crate::error::CompareError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Stream a file through SHA-256
pub fn content_digest(path: &Path) -> Result<ContentDigest, CompareError> {
    let read_error = |source: io::Error| CompareError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(read_error)?;

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    Ok(ContentDigest::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn digest_of_empty_file_is_known_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();

        let digest = content_digest(&path).unwrap();
        assert_eq!(
            digest.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn same_bytes_produce_same_digest() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mov");
        let b = dir.path().join("b.mov");
        fs::write(&a, b"live photo clip").unwrap();
        fs::write(&b, b"live photo clip").unwrap();

        assert_eq!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let result = content_digest(Path::new("/nonexistent/clip.mov"));
        assert!(matches!(result, Err(CompareError::Read { .. })));
    }
}
