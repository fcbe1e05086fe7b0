//! NuGet layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

/// nuget.org v2 feed
pub const DEFAULT_NUGET_REPOSITORY: &str = "https://www.nuget.org/api/v2/";

/// Resolver for `pkg:nuget/<name>@<version>`
///
/// NuGet has no source distribution; `source_download_url_for` is always `None`.
#[derive(Debug, Clone)]
pub struct NugetResolver {
    base_url: String,
}

impl Default for NugetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NUGET_REPOSITORY)
    }
}

impl NugetResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }
}

impl EcosystemResolver for NugetResolver {
    fn purl_type(&self) -> &'static str {
        "nuget"
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
        SafeComponents::of(id)?;
        Ok(None)
    }

    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        let parts = SafeComponents::of(id)?;
        let version = parts.require_version(id)?;
        Ok(Some(format!(
            "{}package/{}/{}",
            self.base_url, parts.name, version
        )))
    }

    fn source_archive_suffix_for(&self, _id: &PackageIdentifier) -> &'static str {
        "nupkg"
    }
}
