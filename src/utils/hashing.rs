//! Content fingerprints for incremental runs

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a source file's content.
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
