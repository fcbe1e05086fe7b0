//! Direct content fetching
//!
//! [`DirectFetcher`] is the network end of the content cache chain. It
//! strips an optional `#L<start>[-L<end>]` fragment, retrieves the document
//! through a [`Transport`], and returns only the requested lines when a
//! valid range was given. Every failure degrades to "no content".

mod fragment;

pub use fragment::{split_fragment, LineRange};

use crate::cache::ContentProvider;
use crate::config::FetchConfig;
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Errors that can occur during fetching
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Scheme other than http, https or file
    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { scheme: String, url: String },

    /// Content too large
    #[error("Content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: u64, max: u64 },
}

/// Maximum size of a fetched document (50 MB)
pub const MAX_CONTENT_SIZE: u64 = 50 * 1024 * 1024;

/// Default request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves the full text behind a URL
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> Result<String, FetchError>;
}

/// Blocking HTTP(S) transport that also serves `file://` URLs
pub struct DefaultTransport {
    client: Client,
    max_size: u64,
}

impl DefaultTransport {
    /// Create a transport with the configured timeout, size limit and user agent
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            max_size: config.max_content_size,
        })
    }

    fn get_http(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.as_str()).send()?;

        // Check status
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Check content length if provided
        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(FetchError::ContentTooLarge {
                    size: len,
                    max: self.max_size,
                });
            }
        }

        // Read with limit
        let mut content = Vec::new();
        response.take(self.max_size + 1).read_to_end(&mut content)?;
        self.check_size(content.len())?;

        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    fn get_file(&self, url: &Url) -> Result<String, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        // Reject oversized files before reading them
        let file = std::fs::File::open(&path)?;
        let len = file.metadata()?.len();
        if len > self.max_size {
            return Err(FetchError::ContentTooLarge {
                size: len,
                max: self.max_size,
            });
        }

        // The file may grow between the size check and the read
        let mut content = Vec::new();
        file.take(self.max_size + 1).read_to_end(&mut content)?;
        self.check_size(content.len())?;
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    fn check_size(&self, len: usize) -> Result<(), FetchError> {
        if len as u64 > self.max_size {
            return Err(FetchError::ContentTooLarge {
                size: len as u64,
                max: self.max_size,
            });
        }
        Ok(())
    }
}

impl Transport for DefaultTransport {
    fn get(&self, url: &Url) -> Result<String, FetchError> {
        match url.scheme() {
            "http" | "https" => self.get_http(url),
            "file" => self.get_file(url),
            other => Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
                url: url.to_string(),
            }),
        }
    }
}

/// Fetches content straight from its source
pub struct DirectFetcher {
    transport: Box<dyn Transport>,
    skip_download: bool,
}

impl DirectFetcher {
    /// Create a fetcher over an explicit transport
    pub fn new(transport: Box<dyn Transport>, skip_download: bool) -> Self {
        Self {
            transport,
            skip_download,
        }
    }

    /// Create a fetcher using [`DefaultTransport`]
    pub fn from_config(config: &FetchConfig, skip_download: bool) -> Result<Self, FetchError> {
        Ok(Self::new(
            Box::new(DefaultTransport::new(config)?),
            skip_download,
        ))
    }

    /// Whether network access is disabled
    pub fn skips_download(&self) -> bool {
        self.skip_download
    }

    /// Fetch a URL, honouring a line-range fragment
    ///
    /// Returns `Ok(None)` when downloads are disabled or the source is
    /// empty; the error value says why a fetch failed.
    pub fn try_fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        if self.skip_download {
            debug!(url, "download skipped");
            return Ok(None);
        }

        let (base, fragment) = split_fragment(url);
        let range = match fragment {
            Some(f) => {
                let range = LineRange::parse(f);
                if range.is_none() {
                    debug!(url, fragment = f, "fragment is not a line range, using full content");
                }
                range
            }
            None => None,
        };

        let parsed = Url::parse(base).map_err(|_| FetchError::InvalidUrl(base.to_string()))?;
        let content = self.transport.get(&parsed)?;

        let content = match range {
            Some(range) => range.extract(&content),
            None => content,
        };

        Ok(Some(content).filter(|c| !c.is_empty()))
    }

    /// Fetch a URL, degrading every failure to `None`
    pub fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url) {
            Ok(content) => content,
            Err(FetchError::InvalidUrl(bad)) => {
                debug!(url = %bad, "malformed URL, no content");
                None
            }
            Err(e) => {
                info!(url, error = %e, "fetch failed, no content");
                None
            }
        }
    }
}

impl ContentProvider for DirectFetcher {
    fn content_for(&self, url: &str) -> Option<String> {
        self.fetch(url)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory transport recording every request
    #[derive(Default, Clone)]
    pub(crate) struct FakeTransport {
        pub pages: Arc<Mutex<HashMap<String, String>>>,
        pub calls: Arc<AtomicUsize>,
        pub requested: Arc<Mutex<Vec<String>>>,
    }

    impl FakeTransport {
        pub fn with_page(self, url: &str, body: &str) -> Self {
            self.pages.lock().insert(url.to_string(), body.to_string());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &Url) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push(url.to_string());
            self.pages
                .lock()
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }

    const DOC: &str = "line1\nline2\nline3\nline4\nline5\n";

    #[test]
    fn test_line_range_fetch() {
        let transport = FakeTransport::default().with_page("https://example/file.txt", DOC);
        let fetcher = DirectFetcher::new(Box::new(transport.clone()), false);

        assert_eq!(
            fetcher.fetch("https://example/file.txt#L2-L3").as_deref(),
            Some("line2\nline3\n")
        );
        assert_eq!(
            fetcher.fetch("https://example/file.txt#L4").as_deref(),
            Some("line4\n")
        );
        // fragment is never sent
        assert!(transport
            .requested
            .lock()
            .iter()
            .all(|u| u == "https://example/file.txt"));
    }

    #[test]
    fn test_malformed_fragment_returns_full_content() {
        let transport = FakeTransport::default().with_page("https://example/file.txt", DOC);
        let fetcher = DirectFetcher::new(Box::new(transport), false);
        assert_eq!(fetcher.fetch("https://example/file.txt#intro").as_deref(), Some(DOC));
    }

    #[test]
    fn test_range_past_end_is_no_content() {
        let transport = FakeTransport::default().with_page("https://example/file.txt", DOC);
        let fetcher = DirectFetcher::new(Box::new(transport), false);
        assert_eq!(fetcher.fetch("https://example/file.txt#L40"), None);
    }

    #[test]
    fn test_skip_download_makes_no_calls() {
        let transport = FakeTransport::default().with_page("https://example/file.txt", DOC);
        let fetcher = DirectFetcher::new(Box::new(transport.clone()), true);
        assert!(fetcher.skips_download());
        assert_eq!(fetcher.fetch("https://example/file.txt"), None);
        assert_eq!(fetcher.fetch("not a url"), None);
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_failures_degrade_to_none() {
        let transport = FakeTransport::default();
        let fetcher = DirectFetcher::new(Box::new(transport.clone()), false);
        assert_eq!(fetcher.fetch("not-a-url"), None);
        assert_eq!(transport.call_count(), 0);
        assert_eq!(fetcher.fetch("https://example/missing"), None);
        assert_eq!(transport.call_count(), 1);
        assert!(matches!(
            fetcher.try_fetch("https://example/missing"),
            Err(FetchError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn test_empty_body_is_no_content() {
        let transport = FakeTransport::default().with_page("https://example/empty", "");
        let fetcher = DirectFetcher::new(Box::new(transport), false);
        assert_eq!(fetcher.try_fetch("https://example/empty").unwrap(), None);
    }

    #[test]
    fn test_default_transport_reads_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("LICENSE");
        std::fs::write(&path, DOC).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let fetcher = DirectFetcher::from_config(&FetchConfig::default(), false).unwrap();
        assert_eq!(
            fetcher.fetch(&format!("{}#L5", url)).as_deref(),
            Some("line5\n")
        );
    }

    #[test]
    fn test_default_transport_limits_file_size() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("COPYING");
        std::fs::write(&path, "x".repeat(64)).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let config = FetchConfig {
            max_content_size: 16,
            ..FetchConfig::default()
        };
        let transport = DefaultTransport::new(&config).unwrap();
        assert!(matches!(
            transport.get(&url),
            Err(FetchError::ContentTooLarge { size: 64, max: 16 })
        ));

        let roomy = DefaultTransport::new(&FetchConfig::default()).unwrap();
        assert_eq!(roomy.get(&url).unwrap().len(), 64);
    }

    #[test]
    fn test_default_transport_rejects_other_schemes() {
        let transport = DefaultTransport::new(&FetchConfig::default()).unwrap();
        let url = Url::parse("ftp://example.com/LICENSE").unwrap();
        assert!(matches!(
            transport.get(&url),
            Err(FetchError::UnsupportedScheme { .. })
        ));
    }
}
