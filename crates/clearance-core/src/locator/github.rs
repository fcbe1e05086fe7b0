//! GitHub release archive layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

pub const DEFAULT_GITHUB_REPOSITORY: &str = "https://github.com/";

/// Resolver for `pkg:github/<owner>/<repo>@<tag>`
#[derive(Debug, Clone)]
pub struct GithubResolver {
    base_url: String,
}

impl Default for GithubResolver {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_REPOSITORY)
    }
}

impl GithubResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }
}

impl EcosystemResolver for GithubResolver {
    fn purl_type(&self) -> &'static str {
        "github"
    }

    fn path_for(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let parts = SafeComponents::of(id)?;
        parts.require_namespace(id)?;
        let version = parts.require_version(id)?;
        let segments = parts
            .namespace
            .iter()
            .copied()
            .chain([parts.name, version]);
        Ok(package_path(self.purl_type(), segments))
    }

    fn source_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        let parts = SafeComponents::of(id)?;
        parts.require_namespace(id)?;
        let version = parts.require_version(id)?;
        Ok(Some(format!(
            "{}{}/{}/archive/refs/tags/{}.tar.gz",
            self.base_url,
            parts.namespace.join("/"),
            parts.name,
            version
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
