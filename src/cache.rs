//! Integrity-checked entries for the sanitized quote cache.
//!
//! Oracle calls are expensive, so sanitized comparison results are cached
//! for a short TTL. Each entry stores a SHA-256 checksum alongside the
//! serialized result; a checksum mismatch on retrieval discards the entry
//! and forces a fresh oracle call instead of serving corrupted data.

use sha2::{Digest, Sha256};

/// Wrapper for cached data with integrity validation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedCacheEntry {
    /// The cached comparison result, as a JSON string.
    pub data: String,
    /// SHA-256 checksum of the data (hex encoded).
    pub checksum: String,
}

impl ValidatedCacheEntry {
    /// Creates a new validated cache entry with computed checksum.
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether the stored checksum still matches the data.
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Serializes the entry for storage in the cache.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserializes and validates a cache entry.
    ///
    /// Returns `Some(data)` if intact, `None` if corrupted or not an entry.
    pub fn deserialize_and_validate(serialized: &str) -> Option<String> {
        let entry: ValidatedCacheEntry = serde_json::from_str(serialized).ok()?;

        if entry.is_valid() {
            Some(entry.data)
        } else {
            tracing::warn!(
                "Quote cache validation failed: checksum mismatch (data length {})",
                entry.data.len()
            );
            None
        }
    }
}

/// Cache key for one search, instrument-agnostic by construction: discounts
/// are applied after retrieval so one entry serves every user.
pub fn search_cache_key(product_name: &str, category: &str, target_price: Option<f64>) -> String {
    match target_price {
        Some(target) => format!("search:{}:{}:{}", category, product_name, target.round() as i64),
        None => format!("search:{}:{}", category, product_name),
    }
}
