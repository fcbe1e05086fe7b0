//! Package location resolution
//!
//! Maps a [`PackageIdentifier`] to its canonical relative storage path and
//! to ecosystem-specific download URLs. Each ecosystem is an
//! [`EcosystemResolver`]; [`PackageLocator`] dispatches to the first
//! registered resolver that claims the identifier's type.
//!
//! ## Layouts
//!
//! | Type | Path | Source download |
//! |------|------|-----------------|
//! | `maven` | `pkg/maven/<ns as dirs>/<name>/<version>` | `<base><ns>/<name>/<version>/<name>-<version>-sources.jar` |
//! | `npm` | `pkg/npm/[<@scope>/]<name>/<version>` | `<base>[<@scope>/]<name>/-/<name>-<version>.tgz` |
//! | `pypi` | `pkg/pypi/<name>/<version>` | `<base>source/<n>/<name>/<name>-<version>.tar.gz` |
//! | `cran` | `pkg/cran/<name>/<version>` | `<base>src/contrib/<name>_<version>.tar.gz` |
//! | `nuget` | `pkg/nuget/<name>/<version>` | unavailable |
//! | `cargo` | `pkg/cargo/<name>/<version>` | `<base><name>/<version>/download` |
//! | `github` | `pkg/github/<owner>/<name>/<version>` | `<base><owner>/<name>/archive/refs/tags/<version>.tar.gz` |
//!
//! An operation the ecosystem has no concept of returns `Ok(None)`.

mod cargo;
mod cran;
mod github;
mod maven;
mod npm;
mod nuget;
mod pypi;

pub use cargo::{CargoResolver, DEFAULT_CARGO_REPOSITORY};
pub use cran::{CranResolver, DEFAULT_CRAN_REPOSITORY};
pub use github::{GithubResolver, DEFAULT_GITHUB_REPOSITORY};
pub use maven::{MavenResolver, DEFAULT_MAVEN_REPOSITORY};
pub use npm::{NpmResolver, DEFAULT_NPM_REPOSITORY};
pub use nuget::{NugetResolver, DEFAULT_NUGET_REPOSITORY};
pub use pypi::{PypiResolver, DEFAULT_PYPI_REPOSITORY};

use crate::config::RepositoryConfig;
use crate::purl::PackageIdentifier;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during package location resolution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocatorError {
    /// No registered resolver handles this package type
    #[error("No resolver registered for package type '{purl_type}'")]
    NoApplicableResolver { purl_type: String },

    /// A component would escape the storage root when used as a path
    #[error("Invalid package name component '{segment}'")]
    InvalidPackageName { segment: String },

    /// A component the ecosystem layout needs is absent
    #[error("Package URL of type '{purl_type}' has no {component}")]
    MissingComponent {
        purl_type: String,
        component: &'static str,
    },
}

impl LocatorError {
    /// Whether the error indicates an integrity violation rather than a
    /// recoverable "cannot resolve" outcome
    pub fn is_fatal(&self) -> bool {
        matches!(self, LocatorError::InvalidPackageName { .. })
    }
}

/// Ecosystem-specific mapping of identifiers to paths and URLs
///
/// Implementations are pure: no I/O, no interior state beyond the
/// configured base repository URL.
pub trait EcosystemResolver: Send + Sync {
    /// Registered package type, matched exactly against `PackageIdentifier::purl_type`
    fn purl_type(&self) -> &'static str;

    /// Whether this resolver handles the identifier
    fn can_handle(&self, id: &PackageIdentifier) -> bool {
        id.purl_type() == self.purl_type()
    }

    /// Relative `/`-delimited storage path rooted at `pkg/<type>/`
    fn path_for(&self, id: &PackageIdentifier) -> Result<String, LocatorError>;

    /// URL of the source archive, `None` when the ecosystem has none
    fn source_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError>;

    /// URL of the distributed package, `None` when it cannot be computed
    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError>;

    /// Conventional file suffix of the source archive
    fn source_archive_suffix_for(&self, id: &PackageIdentifier) -> &'static str;
}

/// Everything the locator knows about one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLocation {
    pub path: String,
    pub source_download_url: Option<String>,
    pub package_download_url: Option<String>,
    pub source_archive_suffix: String,
}

/// Dispatcher over an ordered set of resolvers
pub struct PackageLocator {
    resolvers: Vec<Box<dyn EcosystemResolver>>,
}

impl Default for PackageLocator {
    fn default() -> Self {
        Self::from_config(&RepositoryConfig::default())
    }
}

impl PackageLocator {
    /// Create a locator with no resolvers registered
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Create a locator with every built-in ecosystem, using the configured base URLs
    pub fn from_config(repos: &RepositoryConfig) -> Self {
        let mut locator = Self::empty();
        locator.register(Box::new(MavenResolver::new(&repos.maven)));
        locator.register(Box::new(NpmResolver::new(&repos.npm)));
        locator.register(Box::new(PypiResolver::new(&repos.pypi)));
        locator.register(Box::new(CranResolver::new(&repos.cran)));
        locator.register(Box::new(NugetResolver::new(&repos.nuget)));
        locator.register(Box::new(CargoResolver::new(&repos.cargo)));
        locator.register(Box::new(GithubResolver::new(&repos.github)));
        locator
    }

    /// Append a resolver; earlier registrations win on overlap
    pub fn register(&mut self, resolver: Box<dyn EcosystemResolver>) {
        self.resolvers.push(resolver);
    }

    /// Registered package types, in dispatch order
    pub fn supported_types(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.purl_type()).collect()
    }

    /// First resolver whose `can_handle` accepts the identifier
    pub fn resolver_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<&dyn EcosystemResolver, LocatorError> {
        self.resolvers
            .iter()
            .find(|r| r.can_handle(id))
            .map(|r| r.as_ref())
            .ok_or_else(|| LocatorError::NoApplicableResolver {
                purl_type: id.purl_type().to_string(),
            })
    }

    pub fn path_for(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        self.resolver_for(id)?.path_for(id)
    }

    pub fn source_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        self.resolver_for(id)?.source_download_url_for(id)
    }

    pub fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        self.resolver_for(id)?.package_download_url_for(id)
    }

    pub fn source_archive_suffix_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<&'static str, LocatorError> {
        Ok(self.resolver_for(id)?.source_archive_suffix_for(id))
    }

    /// Resolve path, URLs and suffix in one call
    pub fn locate(&self, id: &PackageIdentifier) -> Result<PackageLocation, LocatorError> {
        let resolver = self.resolver_for(id)?;
        Ok(PackageLocation {
            path: resolver.path_for(id)?,
            source_download_url: resolver.source_download_url_for(id)?,
            package_download_url: resolver.package_download_url_for(id)?,
            source_archive_suffix: resolver.source_archive_suffix_for(id).to_string(),
        })
    }
}

/// Identifier components validated for use in paths and URLs
pub(crate) struct SafeComponents<'a> {
    pub namespace: Vec<&'a str>,
    pub name: &'a str,
    pub version: Option<&'a str>,
}

impl<'a> SafeComponents<'a> {
    /// Validate every component of `id`, rejecting traversal sequences
    pub fn of(id: &'a PackageIdentifier) -> Result<Self, LocatorError> {
        let namespace = id.namespace_segments();
        for segment in &namespace {
            check_segment(segment)?;
        }
        check_segment(id.name())?;
        if let Some(version) = id.version() {
            check_segment(version)?;
        }
        Ok(Self {
            namespace,
            name: id.name(),
            version: id.version(),
        })
    }

    pub fn require_version(&self, id: &PackageIdentifier) -> Result<&'a str, LocatorError> {
        self.version.ok_or_else(|| LocatorError::MissingComponent {
            purl_type: id.purl_type().to_string(),
            component: "version",
        })
    }

    pub fn require_namespace(&self, id: &PackageIdentifier) -> Result<(), LocatorError> {
        if self.namespace.is_empty() {
            return Err(LocatorError::MissingComponent {
                purl_type: id.purl_type().to_string(),
                component: "namespace",
            });
        }
        Ok(())
    }
}

fn check_segment(segment: &str) -> Result<(), LocatorError> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment.contains("..")
        || segment.contains('/')
        || segment.contains('\\')
        || segment.chars().any(|c| c.is_control());
    if invalid {
        return Err(LocatorError::InvalidPackageName {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

/// Build `pkg/<type>/<segments...>`
pub(crate) fn package_path<'s>(
    purl_type: &str,
    segments: impl IntoIterator<Item = &'s str>,
) -> String {
    let mut path = format!("pkg/{}", purl_type);
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    path
}

/// Normalize a base repository URL so relative parts can be appended
pub(crate) fn normalize_base(base: &str) -> String {
    let trimmed = base.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
