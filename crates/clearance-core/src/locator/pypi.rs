//! PyPI (files.pythonhosted.org) layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

/// PyPI file host
pub const DEFAULT_PYPI_REPOSITORY: &str = "https://files.pythonhosted.org/packages/";

/// Resolver for `pkg:pypi/<name>@<version>`
///
/// Only the sdist location is computable; wheel file names depend on
/// platform tags, so the package download is unavailable.
#[derive(Debug, Clone)]
pub struct PypiResolver {
    base_url: String,
}

impl Default for PypiResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PYPI_REPOSITORY)
    }
}

impl PypiResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }
}

impl EcosystemResolver for PypiResolver {
    fn purl_type(&self) -> &'static str {
        "pypi"
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
        let parts = SafeComponents::of(id)?;
        let version = parts.require_version(id)?;
        let first = parts.name.chars().next().unwrap_or_default();
        Ok(Some(format!(
            "{}source/{}/{2}/{2}-{3}.tar.gz",
            self.base_url, first, parts.name, version
        )))
    }

    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        SafeComponents::of(id)?;
        Ok(None)
    }

    fn source_archive_suffix_for(&self, _id: &PackageIdentifier) -> &'static str {
        "tar.gz"
    }
}
