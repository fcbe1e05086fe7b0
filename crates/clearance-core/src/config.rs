//! Configuration parsing (clearance.toml)
//!
//! ```toml
//! [repositories]
//! maven = "https://repo1.maven.org/maven2/"
//!
//! [cache]
//! filesystem_roots = ["/var/cache/clearance"]
//! bundled_roots = ["/usr/share/clearance/licenses"]
//! skip_download = false
//!
//! [fetch]
//! timeout_secs = 30
//! workers = 4
//! ```
//!
//! Every section and field is optional.

use crate::fetch::{MAX_CONTENT_SIZE, REQUEST_TIMEOUT};
use crate::locator::{
    DEFAULT_CARGO_REPOSITORY, DEFAULT_CRAN_REPOSITORY, DEFAULT_GITHUB_REPOSITORY,
    DEFAULT_MAVEN_REPOSITORY, DEFAULT_NPM_REPOSITORY, DEFAULT_NUGET_REPOSITORY,
    DEFAULT_PYPI_REPOSITORY,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub repositories: RepositoryConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
}

/// Base repository URL per ecosystem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepositoryConfig {
    pub maven: String,
    pub npm: String,
    pub pypi: String,
    pub cran: String,
    pub nuget: String,
    pub cargo: String,
    pub github: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            maven: DEFAULT_MAVEN_REPOSITORY.to_string(),
            npm: DEFAULT_NPM_REPOSITORY.to_string(),
            pypi: DEFAULT_PYPI_REPOSITORY.to_string(),
            cran: DEFAULT_CRAN_REPOSITORY.to_string(),
            nuget: DEFAULT_NUGET_REPOSITORY.to_string(),
            cargo: DEFAULT_CARGO_REPOSITORY.to_string(),
            github: DEFAULT_GITHUB_REPOSITORY.to_string(),
        }
    }
}

impl RepositoryConfig {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("maven", self.maven.as_str()),
            ("npm", self.npm.as_str()),
            ("pypi", self.pypi.as_str()),
            ("cran", self.cran.as_str()),
            ("nuget", self.nuget.as_str()),
            ("cargo", self.cargo.as_str()),
            ("github", self.github.as_str()),
        ]
    }
}

/// Cache tier locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Writable cache directories; the first receives new entries
    pub filesystem_roots: Vec<PathBuf>,

    /// Read-only directories of shipped license texts
    pub bundled_roots: Vec<PathBuf>,

    /// Disable every network fetch
    pub skip_download: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            filesystem_roots: vec![default_cache_root()],
            bundled_roots: Vec::new(),
            skip_download: false,
        }
    }
}

/// Network behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_content_size: u64,
    pub user_agent: String,

    /// Upper bound on concurrent enrichment workers (and thus requests)
    pub workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
            max_content_size: MAX_CONTENT_SIZE,
            user_agent: format!("clearance/{}", env!("CARGO_PKG_VERSION")),
            workers: 4,
        }
    }
}

/// `<home>/.clearance/cache`, or `.clearance/cache` when home is unknown
pub fn default_cache_root() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".clearance").join("cache"))
        .unwrap_or_else(|| PathBuf::from(".clearance").join("cache"))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;

        // Validate
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Repository base URLs must be fetchable over http(s)
        for (ecosystem, base) in self.repositories.entries() {
            let parsed = url::Url::parse(base).map_err(|_| {
                ConfigError::ValidationError(format!(
                    "repositories.{} is not a valid URL: '{}'",
                    ecosystem, base
                ))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::ValidationError(format!(
                    "repositories.{} must be an http(s) URL: '{}'",
                    ecosystem, base
                )));
            }
        }

        // Limits
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.fetch.workers == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.workers must be > 0".to_string(),
            ));
        }
        if self.fetch.max_content_size == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.max_content_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.repositories.maven, DEFAULT_MAVEN_REPOSITORY);
        assert!(!config.cache.skip_download);
        assert_eq!(config.fetch.workers, 4);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_str(
            r#"
[repositories]
maven = "http://test/"

[cache]
filesystem_roots = ["/tmp/a", "/tmp/b"]
skip_download = true

[fetch]
workers = 2
"#,
        )
        .unwrap();
        assert_eq!(config.repositories.maven, "http://test/");
        assert_eq!(config.repositories.npm, DEFAULT_NPM_REPOSITORY);
        assert_eq!(
            config.cache.filesystem_roots,
            vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")]
        );
        assert!(config.cache.skip_download);
        assert_eq!(config.fetch.workers, 2);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_rejects_bad_repository_url() {
        let result = Config::from_str("[repositories]\nnpm = \"not a url\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let result = Config::from_str("[repositories]\nnpm = \"ftp://mirror/\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let result = Config::from_str("[fetch]\nworkers = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = Config::from_str("[cache\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("clearance.toml");
        std::fs::write(&path, "[fetch]\ntimeout_secs = 5\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);

        let missing = Config::from_file(&temp.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }
}
