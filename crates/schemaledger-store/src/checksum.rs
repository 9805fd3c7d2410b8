//! Content checksums
//!
//! SHA-256 over unit and bootstrap SQL, recorded at apply time so later
//! edits to already-applied content can be detected.

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
