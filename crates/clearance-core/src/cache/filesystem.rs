//! Persistent filesystem tier
//!
//! One file per entry, named by the cache key, holding the fetched text
//! verbatim. Entries are never evicted here.
//!
//! ```text
//! <root>/
//! ├── .tmp/                 # in-flight writes, renamed into place
//! └── http___example_com_LICENSE
//! ```

use super::{CacheKey, ContentTier, LogOnce};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Directory under each root holding in-flight writes; keys never start with `.`
const TMP_DIR: &str = ".tmp";

/// Read/write tier over one or more cache directories
///
/// Lookups consult every root in order; write-back goes to the first root.
pub struct FilesystemTier {
    roots: Vec<PathBuf>,
    missing: LogOnce,
    tmp_counter: AtomicU64,
}

impl FilesystemTier {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            missing: LogOnce::default(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// Directories consulted by this tier
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Path an entry is written to
    pub fn entry_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.roots.first().map(|root| root.join(key.as_str()))
    }

    fn try_store(&self, root: &Path, key: &CacheKey, content: &str) -> std::io::Result<()> {
        let tmp_dir = root.join(TMP_DIR);
        fs::create_dir_all(&tmp_dir)?;

        // Write to a temporary file first, then rename into place.
        // The name is independent of the key so long keys stay within
        // file name limits.
        let tmp_path = tmp_dir.join(format!(
            "{}.{}.tmp",
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;

        let final_path = root.join(key.as_str());
        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl ContentTier for FilesystemTier {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn lookup(&self, key: &CacheKey) -> Option<String> {
        read_from_roots(&self.roots, key, &self.missing)
    }

    fn store(&self, key: &CacheKey, content: &str) {
        let Some(root) = self.roots.first() else {
            return;
        };
        match self.try_store(root, key, content) {
            Ok(()) => debug!(key = %key, root = %root.display(), "cached content on disk"),
            Err(e) => warn!(key = %key, root = %root.display(), error = %e, "failed to write cache entry"),
        }
    }
}

/// Read `key` from the first root containing it
///
/// Absent roots are reported once per tier instance.
pub(super) fn read_from_roots(
    roots: &[PathBuf],
    key: &CacheKey,
    missing: &LogOnce,
) -> Option<String> {
    for root in roots {
        if !root.is_dir() {
            if missing.first(&root.to_string_lossy()) {
                info!(root = %root.display(), "cache root does not exist");
            }
            continue;
        }
        let path = root.join(key.as_str());
        if !path.is_file() {
            continue;
        }
        match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => continue,
            Ok(bytes) => return Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                if missing.first(&path.to_string_lossy()) {
                    info!(path = %path.display(), error = %e, "cache entry unreadable");
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{HASHED_KEY_PREFIX, MAX_KEY_LENGTH};
    use tempfile::TempDir;

    #[test]
    fn test_store_creates_root_and_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("cache");
        let tier = FilesystemTier::new(vec![root.clone()]);
        let key = CacheKey::from_url("https://example.com/LICENSE");

        assert_eq!(tier.lookup(&key), None);
        tier.store(&key, "ISC License");
        assert_eq!(fs::read_to_string(root.join(key.as_str())).unwrap(), "ISC License");
        assert_eq!(tier.lookup(&key).as_deref(), Some("ISC License"));
        assert_eq!(tier.entry_path(&key), Some(root.join(key.as_str())));
    }

    #[test]
    fn test_store_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let tier = FilesystemTier::new(vec![temp.path().to_path_buf()]);
        let key = CacheKey::from_url("https://example.com/LICENSE");
        tier.store(&key, "same");
        tier.store(&key, "same");
        assert_eq!(tier.lookup(&key).as_deref(), Some("same"));

        // No temporary files left behind
        assert_eq!(fs::read_dir(temp.path().join(TMP_DIR)).unwrap().count(), 0);
        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|name| name == key.as_str()));
    }

    #[test]
    fn test_store_key_at_length_limit() {
        let temp = TempDir::new().unwrap();
        let tier = FilesystemTier::new(vec![temp.path().to_path_buf()]);

        // "https://e/" maps to a 9 character prefix
        let url = format!("https://e/{}", "a".repeat(MAX_KEY_LENGTH - 9));
        let key = CacheKey::from_url(&url);
        assert_eq!(key.as_str().len(), MAX_KEY_LENGTH);
        assert!(!key.as_str().starts_with(HASHED_KEY_PREFIX));

        tier.store(&key, "MIT License");
        assert!(temp.path().join(key.as_str()).is_file());

        // A fresh tier (next run) still finds it
        let next_run = FilesystemTier::new(vec![temp.path().to_path_buf()]);
        assert_eq!(next_run.lookup(&key).as_deref(), Some("MIT License"));
    }

    #[test]
    fn test_missing_root_reported_once() {
        let temp = TempDir::new().unwrap();
        let absent = temp.path().join("absent");
        let tier = FilesystemTier::new(vec![absent.clone()]);
        let key = CacheKey::from_url("https://example.com/LICENSE");

        assert_eq!(tier.lookup(&key), None);
        assert_eq!(tier.lookup(&key), None);

        // The root was recorded by the first lookup
        assert!(!tier.missing.first(&absent.to_string_lossy()));
        assert!(!absent.exists());
    }

    #[test]
    fn test_lookup_falls_through_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let key = CacheKey::from_url("https://example.com/NOTICE");
        fs::write(second.path().join(key.as_str()), "notice").unwrap();

        let tier = FilesystemTier::new(vec![
            first.path().join("absent"),
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(tier.lookup(&key).as_deref(), Some("notice"));
        assert_eq!(tier.lookup(&key).as_deref(), Some("notice"));
    }

    #[test]
    fn test_no_roots() {
        let tier = FilesystemTier::new(Vec::new());
        let key = CacheKey::from_url("https://example.com/LICENSE");
        tier.store(&key, "ignored");
        assert_eq!(tier.lookup(&key), None);
        assert_eq!(tier.entry_path(&key), None);
    }
}
