//! CRAN layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

/// Main CRAN mirror
pub const DEFAULT_CRAN_REPOSITORY: &str = "https://cran.r-project.org/";

/// Resolver for `pkg:cran/<name>@<version>`
///
/// CRAN distributes source packages, so both download URLs are the same tarball.
#[derive(Debug, Clone)]
pub struct CranResolver {
    base_url: String,
}

impl Default for CranResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CRAN_REPOSITORY)
    }
}

impl CranResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }

    fn tarball_url(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let parts = SafeComponents::of(id)?;
        let version = parts.require_version(id)?;
        Ok(format!(
            "{}src/contrib/{}_{}.tar.gz",
            self.base_url, parts.name, version
        ))
    }
}

impl EcosystemResolver for CranResolver {
    fn purl_type(&self) -> &'static str {
        "cran"
    }

    fn path_for(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let parts = SafeComponents::of(id)?;
        let version = parts.require_version(id)?;
        Ok(package_path(self.purl_type(), [parts.name, version]))
    }

    fn source_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        self.tarball_url(id).map(Some)
    }

    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        self.tarball_url(id).map(Some)
    }

    fn source_archive_suffix_for(&self, _id: &PackageIdentifier) -> &'static str {
        "tar.gz"
    }
}
