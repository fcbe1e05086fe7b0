//! Clearance core library
//!
//! Resolves package identities and fetches the license texts they point at:
//! - Package URL parsing (`pkg:<type>/<namespace>/<name>@<version>`)
//! - Per-ecosystem download/source locations (Maven, npm, PyPI, CRAN, NuGet, Cargo, GitHub)
//! - Cascading content cache (memory → bundled → filesystem → network)
//! - Line-range aware direct fetching
//! - Heuristic license URL guessing for GitHub links
//! - Content-addressable text interning

pub mod cache;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod guess;
pub mod locator;
pub mod pool;
pub mod purl;

pub use cache::{
    BundledTier, CacheKey, CascadingCache, ContentProvider, ContentTier, FilesystemTier,
    InMemoryTier,
};
pub use config::{CacheConfig, Config, ConfigError, FetchConfig, RepositoryConfig};
pub use enrich::{ComponentRequest, EnrichError, EnrichedComponent, Enricher};
pub use fetch::{DefaultTransport, DirectFetcher, FetchError, LineRange, Transport};
pub use guess::{GuessResult, LicenseUrlGuesser};
pub use locator::{EcosystemResolver, LocatorError, PackageLocator};
pub use pool::{PoolError, TextPool, NULL_TEXT_KEY};
pub use purl::{PackageIdentifier, PurlError};
