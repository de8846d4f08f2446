//! Hashing utilities for persisted boards.

use sha2::{Digest, Sha256};

/// SHA-256 of `bytes` as lowercase hex.
pub fn board_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// First 8 bytes of the digest, for compact logging.
pub fn short_digest(digest: &str) -> &str {
    digest.get(..16).unwrap_or(digest)
}
