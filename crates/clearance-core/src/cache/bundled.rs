//! Read-only tier over license texts shipped with the distribution

use super::filesystem::read_from_roots;
use super::{CacheKey, ContentTier, LogOnce};
use std::path::PathBuf;

/// Read-only tier using the same file layout as [`super::FilesystemTier`]
///
/// Holds well-known license texts so common OSS licenses never need a
/// network round-trip. Write-back is ignored.
pub struct BundledTier {
    roots: Vec<PathBuf>,
    missing: LogOnce,
}

impl BundledTier {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            missing: LogOnce::default(),
        }
    }
}

impl ContentTier for BundledTier {
    fn name(&self) -> &str {
        "bundled"
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        read_from_roots(&self.roots, key, &self.missing)
    }

    fn store(&self, _key: &CacheKey, _content: &str) {}
}
