//! Process-lifetime in-memory tier

use super::{CacheKey, ContentTier};
use dashmap::DashMap;

/// Front tier holding everything seen during the run
#[derive(Debug, Default)]
pub struct InMemoryTier {
    entries: DashMap<CacheKey, String>,
}

impl InMemoryTier {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentTier for InMemoryTier {
    fn name(&self) -> &str {
        "memory"
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn store(&self, key: &CacheKey, content: &str) {
        self.entries.insert(key.clone(), content.to_string());
    }
}
