use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the raw file bytes. Used as the cache key for
/// both extraction and analysis.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// First 8 hex chars, for log lines.
pub fn short(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}
