use sha2::{Digest, Sha256};

/// SHA-256 of arbitrary bytes as lowercase hex.
pub(crate) fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
