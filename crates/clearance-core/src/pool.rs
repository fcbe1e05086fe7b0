//! Content-addressable text pool
//!
//! Interns license texts and other blobs by their SHA-256 digest so that a
//! text shared by thousands of components is held in memory once.
//! Distinct texts with colliding digests are not detected.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

/// Key returned for an absent text; never backed by storage
pub const NULL_TEXT_KEY: &str = "NULL";

/// Errors that can occur during pool lookups
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Key was never produced by `store` on this pool
    #[error("Text not found in pool: {0}")]
    NotFound(String),
}

/// Deduplicating text store keyed by hex SHA-256
///
/// Safe to share across worker threads; insertion is atomic per key.
#[derive(Debug, Default)]
pub struct TextPool {
    texts: DashMap<String, Arc<str>>,
}

impl TextPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            texts: DashMap::new(),
        }
    }

    /// Store a text and return its key
    ///
    /// `None` maps to [`NULL_TEXT_KEY`] and stores nothing.
    pub fn store(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return NULL_TEXT_KEY.to_string();
        };
        let key = hash_text(text);
        self.texts
            .entry(key.clone())
            .or_insert_with(|| Arc::from(text));
        key
    }

    /// Retrieve a text by key
    ///
    /// Returns `Ok(None)` for [`NULL_TEXT_KEY`].
    pub fn retrieve(&self, key: &str) -> Result<Option<Arc<str>>, PoolError> {
        if key == NULL_TEXT_KEY {
            return Ok(None);
        }
        self.texts
            .get(key)
            .map(|entry| Some(Arc::clone(entry.value())))
            .ok_or_else(|| PoolError::NotFound(key.to_string()))
    }

    /// Whether a non-null key is present
    pub fn contains(&self, key: &str) -> bool {
        self.texts.contains_key(key)
    }

    /// Number of distinct texts stored
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Hex-encoded SHA-256 of a text
pub fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_store_and_retrieve() {
        let pool = TextPool::new();
        let key = pool.store(Some("MIT License"));
        assert_eq!(key.len(), 64);
        assert_eq!(pool.retrieve(&key).unwrap().as_deref(), Some("MIT License"));
    }

    #[test]
    fn test_duplicate_store() {
        let pool = TextPool::new();
        let first = pool.store(Some("Apache License 2.0"));
        let second = pool.store(Some("Apache License 2.0"));
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);

        pool.store(Some("BSD-3-Clause"));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_null_round_trip() {
        let pool = TextPool::new();
        let key = pool.store(None);
        assert_eq!(key, NULL_TEXT_KEY);
        assert!(pool.is_empty());
        assert_eq!(pool.retrieve(&key).unwrap(), None);
    }

    #[test]
    fn test_empty_text_is_stored() {
        let pool = TextPool::new();
        let key = pool.store(Some(""));
        assert_ne!(key, NULL_TEXT_KEY);
        assert_eq!(pool.retrieve(&key).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_unknown_key() {
        let pool = TextPool::new();
        let result = pool.retrieve(&"0".repeat(64));
        assert!(matches!(result, Err(PoolError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_store_same_text() {
        let pool = Arc::new(TextPool::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || pool.store(Some("GPL-3.0-only")))
            })
            .collect();
        let keys: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(pool.len(), 1);
    }
}
