use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of the key bytes.
pub fn key_digest(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable pseudo-random order: ascending by digest, then by key.
///
/// The result depends only on the set of keys, never on listing order, so
/// repeated triggers for the same group stitch parts in the same sequence.
pub fn order_by_digest(mut keys: Vec<String>) -> Vec<String> {
    keys.sort_by_cached_key(|key| (key_digest(key), key.clone()));
    keys
}
