//! Cascading content cache
//!
//! Content for a URL is looked up through an ordered list of tiers and,
//! failing all of them, fetched by the terminal [`NetworkTier`]:
//!
//! ```text
//! CacheKey::from_url(url)
//!      │
//!      ▼
//! ┌──────────┐   ┌──────────┐   ┌────────────┐   ┌─────────────┐
//! │ InMemory │──▶│ Bundled  │──▶│ Filesystem │──▶│   Network   │
//! │  (run)   │   │ (r/o)    │   │ (persist)  │   │ DirectFetch │
//! └──────────┘   └──────────┘   └────────────┘   └─────────────┘
//!      ▲              ▲               ▲                 │
//!      └──────────────┴───────────────┴── write-back ───┘
//! ```
//!
//! A hit at tier *n* is written back into tiers `0..n`. Only the terminal
//! tier remembers misses; intermediate tiers never store absence. The key
//! is derived once and used unchanged by every tier.

mod bundled;
mod filesystem;
mod key;
mod memory;
mod network;

pub use bundled::BundledTier;
pub use filesystem::FilesystemTier;
pub use key::{CacheKey, HASHED_KEY_PREFIX, MAX_KEY_LENGTH};
pub use memory::InMemoryTier;
pub use network::NetworkTier;

use crate::config::Config;
use crate::fetch::{DirectFetcher, FetchError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Anything that can produce text for a URL
///
/// Implementations never fail: every problem degrades to `None`.
pub trait ContentProvider: Send + Sync {
    fn content_for(&self, url: &str) -> Option<String>;
}

/// One non-terminal tier of the cascade
pub trait ContentTier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Content held by this tier itself, without delegating
    fn lookup(&self, key: &CacheKey) -> Option<String>;

    /// Accept content found in a slower tier; read-only tiers ignore it
    fn store(&self, key: &CacheKey, content: &str);
}

impl<T: ContentTier + ?Sized> ContentTier for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        (**self).lookup(key)
    }

    fn store(&self, key: &CacheKey, content: &str) {
        (**self).store(key, content)
    }
}

/// Ordered tiers in front of a network tier
pub struct CascadingCache {
    tiers: Vec<Box<dyn ContentTier>>,
    terminal: NetworkTier,
}

impl CascadingCache {
    /// Create a cache with only the terminal tier
    pub fn new(terminal: NetworkTier) -> Self {
        Self {
            tiers: Vec::new(),
            terminal,
        }
    }

    /// Append a tier behind the ones already present
    pub fn with_tier(mut self, tier: Box<dyn ContentTier>) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Build the standard chain: memory, bundled, filesystem, network
    ///
    /// Bundled and filesystem tiers are only added when roots are configured.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = DirectFetcher::from_config(&config.fetch, config.cache.skip_download)?;
        let mut cache =
            Self::new(NetworkTier::new(fetcher)).with_tier(Box::new(InMemoryTier::new()));
        if !config.cache.bundled_roots.is_empty() {
            cache = cache.with_tier(Box::new(BundledTier::new(
                config.cache.bundled_roots.clone(),
            )));
        }
        if !config.cache.filesystem_roots.is_empty() {
            cache = cache.with_tier(Box::new(FilesystemTier::new(
                config.cache.filesystem_roots.clone(),
            )));
        }
        Ok(cache)
    }

    /// Tier names in lookup order, terminal last
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers
            .iter()
            .map(|t| t.name())
            .chain(std::iter::once(self.terminal.name()))
            .collect()
    }

    /// Content for a URL
    pub fn get(&self, url: &str) -> Option<String> {
        let key = CacheKey::from_url(url);
        self.get_keyed(&key, url)
    }

    /// Content for a URL whose key is already derived
    pub fn get_keyed(&self, key: &CacheKey, url: &str) -> Option<String> {
        for (depth, tier) in self.tiers.iter().enumerate() {
            if let Some(content) = tier.lookup(key) {
                debug!(tier = tier.name(), key = %key, "cache hit");
                self.write_back(&self.tiers[..depth], key, &content);
                return Some(content);
            }
        }

        // Every tier missed; fetch and warm them all
        let content = self.terminal.fetch(key, url)?;
        self.write_back(&self.tiers, key, &content);
        Some(content)
    }

    fn write_back(&self, tiers: &[Box<dyn ContentTier>], key: &CacheKey, content: &str) {
        for tier in tiers {
            tier.store(key, content);
        }
    }
}

impl ContentProvider for CascadingCache {
    fn content_for(&self, url: &str) -> Option<String> {
        self.get(url)
    }
}

/// Remembers which items were already reported, so each is logged once
#[derive(Debug, Default)]
pub(crate) struct LogOnce {
    seen: Mutex<HashSet<String>>,
}

impl LogOnce {
    /// True the first time `item` is seen
    pub fn first(&self, item: &str) -> bool {
        self.seen.lock().insert(item.to_string())
    }
}
