//! Cache key derivation
//!
//! Keys double as file names in the filesystem tiers, so they contain only
//! `[A-Za-z0-9_]` and never exceed [`MAX_KEY_LENGTH`].

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt;

/// Longest key produced by direct character replacement
pub const MAX_KEY_LENGTH: usize = 250;

/// Prefix of keys replaced by a digest of the URL
pub const HASHED_KEY_PREFIX: &str = "sha256_";

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("non-word pattern is valid"));

/// Deterministic, file-name-safe key for a source URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a URL
    ///
    /// The scheme is compared case-insensitively and `https://` is treated as
    /// `http://`, so all spellings of a URL share an entry.
    /// Keys longer than [`MAX_KEY_LENGTH`] become `sha256_<hex of the URL>`.
    pub fn from_url(url: &str) -> Self {
        let normalized = match url.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("https") => {
                format!("http://{}", rest)
            }
            Some((scheme, rest)) if is_scheme(scheme) => {
                format!("{}://{}", scheme.to_ascii_lowercase(), rest)
            }
            _ => url.to_string(),
        };
        let replaced = NON_WORD.replace_all(&normalized, "_");
        if replaced.len() <= MAX_KEY_LENGTH {
            return Self(replaced.into_owned());
        }
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        Self(format!("{}{}", HASHED_KEY_PREFIX, digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_scheme(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_word_replaced() {
        let key = CacheKey::from_url("http://www.apache.org/licenses/LICENSE-2.0.txt");
        assert_eq!(key.as_str(), "http___www_apache_org_licenses_LICENSE_2_0_txt");
    }

    #[test]
    fn test_https_shares_key_with_http() {
        assert_eq!(
            CacheKey::from_url("https://opensource.org/licenses/MIT"),
            CacheKey::from_url("http://opensource.org/licenses/MIT")
        );
    }

    #[test]
    fn test_scheme_case_is_ignored() {
        let expected = CacheKey::from_url("http://host/x");
        for url in ["HTTPS://host/x", "Https://host/x", "HTTP://host/x", "https://host/x"] {
            assert_eq!(CacheKey::from_url(url), expected, "{}", url);
        }
        // only the scheme is folded
        assert_ne!(CacheKey::from_url("http://host/X"), expected);
    }

    #[test]
    fn test_key_is_bounded() {
        for len in [250usize, 251, 1_000, 10_000] {
            let url = format!("https://example.com/{}", "a".repeat(len));
            let key = CacheKey::from_url(&url);
            assert!(key.as_str().len() <= MAX_KEY_LENGTH, "len {}", len);
        }
    }

    #[test]
    fn test_long_key_is_hashed_and_deterministic() {
        let url = format!("https://example.com/{}", "x".repeat(500));
        let key = CacheKey::from_url(&url);
        assert!(key.as_str().starts_with(HASHED_KEY_PREFIX));
        assert_eq!(key.as_str().len(), HASHED_KEY_PREFIX.len() + 64);
        assert_eq!(key, CacheKey::from_url(&url));
        let other = format!("https://example.com/{}", "y".repeat(500));
        assert_ne!(key, CacheKey::from_url(&other));
    }

    #[test]
    fn test_non_ascii_is_replaced() {
        let key = CacheKey::from_url("https://example.com/lizenz-ü");
        assert!(key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}
