//! crates.io layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

/// crates.io download API
pub const DEFAULT_CARGO_REPOSITORY: &str = "https://crates.io/api/v1/crates/";

/// Resolver for `pkg:cargo/<name>@<version>`
///
/// A published `.crate` is the source archive, so both URLs coincide.
#[derive(Debug, Clone)]
pub struct CargoResolver {
    base_url: String,
}

impl Default for CargoResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CARGO_REPOSITORY)
    }
}

impl CargoResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }

    fn download_url(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let parts = SafeComponents::of(id)?;
        let version = parts.require_version(id)?;
        Ok(format!("{}{}/{}/download", self.base_url, parts.name, version))
    }
}

impl EcosystemResolver for CargoResolver {
    fn purl_type(&self) -> &'static str {
        "cargo"
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
        self.download_url(id).map(Some)
    }

    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        self.download_url(id).map(Some)
    }

    fn source_archive_suffix_for(&self, _id: &PackageIdentifier) -> &'static str {
        "crate"
    }
}
