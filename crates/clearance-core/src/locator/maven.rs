//! Maven repository layout

use super::{normalize_base, package_path, EcosystemResolver, LocatorError, SafeComponents};
use crate::purl::PackageIdentifier;

/// Maven Central
pub const DEFAULT_MAVEN_REPOSITORY: &str = "https://repo1.maven.org/maven2/";

/// Resolver for `pkg:maven/<groupId>/<artifactId>@<version>`
#[derive(Debug, Clone)]
pub struct MavenResolver {
    base_url: String,
}

impl Default for MavenResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAVEN_REPOSITORY)
    }
}

impl MavenResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }

    /// `<group as dirs>/<artifact>/<version>` plus the version
    fn artifact_dir<'a>(
        &self,
        id: &'a PackageIdentifier,
    ) -> Result<(Vec<&'a str>, &'a str), LocatorError> {
        let parts = SafeComponents::of(id)?;
        parts.require_namespace(id)?;
        let version = parts.require_version(id)?;

        let mut segments = Vec::new();
        for group_part in parts.namespace.iter().copied().flat_map(|ns| ns.split('.')) {
            if group_part.is_empty() {
                return Err(LocatorError::InvalidPackageName {
                    segment: id.namespace().unwrap_or_default().to_string(),
                });
            }
            segments.push(group_part);
        }
        segments.push(parts.name);
        segments.push(version);
        Ok((segments, version))
    }
}

impl EcosystemResolver for MavenResolver {
    fn purl_type(&self) -> &'static str {
        "maven"
    }

    fn path_for(&self, id: &PackageIdentifier) -> Result<String, LocatorError> {
        let (segments, _) = self.artifact_dir(id)?;
        Ok(package_path(self.purl_type(), segments))
    }

    fn source_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        let (segments, version) = self.artifact_dir(id)?;
        Ok(Some(format!(
            "{}{}/{}-{}-sources.jar",
            self.base_url,
            segments.join("/"),
            id.name(),
            version
        )))
    }

    fn package_download_url_for(
        &self,
        id: &PackageIdentifier,
    ) -> Result<Option<String>, LocatorError> {
        let (segments, version) = self.artifact_dir(id)?;
        let classifier = id
            .qualifier("classifier")
            .map(|c| format!("-{}", c))
            .unwrap_or_default();
        let extension = id.qualifier("type").unwrap_or("jar");
        Ok(Some(format!(
            "{}{}/{}-{}{}.{}",
            self.base_url,
            segments.join("/"),
            id.name(),
            version,
            classifier,
            extension
        )))
    }

    fn source_archive_suffix_for(&self, _id: &PackageIdentifier) -> &'static str {
        "jar"
    }
}
