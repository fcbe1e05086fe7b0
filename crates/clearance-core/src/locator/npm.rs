//! npm registry layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

/// Public npm registry
pub const DEFAULT_NPM_REPOSITORY: &str = "https://registry.npmjs.org/";

/// Resolver for `pkg:npm/[%40scope/]<name>@<version>`
#[derive(Debug, Clone)]
pub struct NpmResolver {
    base_url: String,
}

impl Default for NpmResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NPM_REPOSITORY)
    }
}

impl NpmResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }

    fn tarball_url(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let parts = SafeComponents::of(id)?;
        let version = parts.require_version(id)?;
        let mut url = self.base_url.clone();
        for scope in &parts.namespace {
            url.push_str(scope);
            url.push('/');
        }
        url.push_str(&format!("{0}/-/{0}-{1}.tgz", parts.name, version));
        Ok(url)
    }
}

impl EcosystemResolver for NpmResolver {
    fn purl_type(&self) -> &'static str {
        "npm"
    }

    fn path_for(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let parts = SafeComponents::of(id)?;
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
        self.tarball_url(id).map(Some)
    }

    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        self.tarball_url(id).map(Some)
    }

    fn source_archive_suffix_for(&self, _id: &PackageIdentifier) -> &'static str {
        "tgz"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purl(s: &str) -> PackageIdentifier {
        PackageIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_path_for_scoped() {
        let resolver = NpmResolver::new("http://test/");
        let id = purl("pkg:npm/%40somenamespace/package@4.5.35");
        assert_eq!(
            resolver.path_for(&id).unwrap(),
            "pkg/npm/@somenamespace/package/4.5.35"
        );
    }

    #[test]
    fn test_path_for_unscoped() {
        let resolver = NpmResolver::default();
        let id = purl("pkg:npm/left-pad@1.3.0");
        assert_eq!(resolver.path_for(&id).unwrap(), "pkg/npm/left-pad/1.3.0");
    }

    #[test]
    fn test_tarball_urls() {
        let resolver = NpmResolver::new("http://test/");
        let id = purl("pkg:npm/%40somenamespace/package@4.5.35");
        let expected = "http://test/@somenamespace/package/-/package-4.5.35.tgz";
        assert_eq!(
            resolver.source_download_url_for(&id).unwrap().as_deref(),
            Some(expected)
        );
        assert_eq!(
            resolver.package_download_url_for(&id).unwrap().as_deref(),
            Some(expected)
        );
        assert_eq!(resolver.source_archive_suffix_for(&id), "tgz");
    }
}
