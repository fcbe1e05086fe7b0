//! Terminal network tier

use super::CacheKey;
use crate::fetch::DirectFetcher;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;

/// Fetches through [`DirectFetcher`] and remembers misses for the run
pub struct NetworkTier {
    fetcher: DirectFetcher,
    known_misses: Mutex<HashSet<CacheKey>>,
}

impl NetworkTier {
    pub fn new(fetcher: DirectFetcher) -> Self {
        Self {
            fetcher,
            known_misses: Mutex::new(HashSet::new()),
        }
    }

    pub fn name(&self) -> &str {
        "network"
    }

    /// Fetch `url`, skipping keys already known to produce nothing
    pub fn fetch(&self, key: &CacheKey, url: &str) -> Option<String> {
        if self.known_misses.lock().contains(key) {
            debug!(key = %key, "known miss");
            return None;
        }
        let content = self.fetcher.fetch(url);
        if content.is_none() && !self.fetcher.skips_download() {
            self.known_misses.lock().insert(key.clone());
        }
        content
    }

    /// Number of keys remembered as misses
    pub fn known_miss_count(&self) -> usize {
        self.known_misses.lock().len()
    }
}
