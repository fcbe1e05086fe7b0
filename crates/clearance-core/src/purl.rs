//! Package URL parsing
//!
//! Parses identifiers of the form
//! `pkg:<type>/[<namespace>/]<name>[@<version>][?<qualifiers>][#<subpath>]`.
//! Namespace and name components are percent-decoded, so the npm scope in
//! `pkg:npm/%40scope/pkg@1.0.0` becomes `@scope`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scheme prefix shared by every package URL
pub const PURL_SCHEME: &str = "pkg";

/// Characters left unencoded when rendering a component
const COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'+');

/// Errors that can occur while parsing a package URL
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PurlError {
    /// Input does not start with `pkg:`
    #[error("Package URL must start with 'pkg:': {0}")]
    MissingScheme(String),

    /// No type component
    #[error("Package URL has no type: {0}")]
    MissingType(String),

    /// Type contains characters outside `[a-z0-9.+-]` or starts with a digit
    #[error("Invalid package type '{0}'")]
    InvalidType(String),

    /// No name component
    #[error("Package URL has no name: {0}")]
    MissingName(String),

    /// Percent-encoded component does not decode to UTF-8
    #[error("Invalid percent-encoding in '{0}'")]
    InvalidEncoding(String),
}

/// A parsed package URL
///
/// Immutable once parsed. `purl_type` is always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentifier {
    purl_type: String,
    namespace: Option<String>,
    name: String,
    version: Option<String>,
    qualifiers: BTreeMap<String, String>,
    subpath: Option<String>,
}

impl PackageIdentifier {
    /// Build an identifier from already-decoded components
    pub fn new(
        purl_type: &str,
        namespace: Option<&str>,
        name: &str,
        version: Option<&str>,
    ) -> Result<Self, PurlError> {
        let purl_type = validate_type(purl_type, purl_type)?;
        if name.is_empty() {
            return Err(PurlError::MissingName(name.to_string()));
        }
        Ok(Self {
            purl_type,
            namespace: namespace.filter(|ns| !ns.is_empty()).map(String::from),
            name: name.to_string(),
            version: version.filter(|v| !v.is_empty()).map(String::from),
            qualifiers: BTreeMap::new(),
            subpath: None,
        })
    }

    /// Parse a package URL string
    pub fn parse(input: &str) -> Result<Self, PurlError> {
        let trimmed = input.trim();

        let rest = match trimmed.split_once(':') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(PURL_SCHEME) => rest,
            _ => return Err(PurlError::MissingScheme(input.to_string())),
        };

        // pkg://type/... is tolerated
        let rest = rest.trim_start_matches('/');

        let (rest, subpath) = match rest.split_once('#') {
            Some((head, sub)) => (head, decode_subpath(sub)?),
            None => (rest, None),
        };

        let (rest, qualifiers) = match rest.split_once('?') {
            Some((head, query)) => (head, parse_qualifiers(query)?),
            None => (rest, BTreeMap::new()),
        };

        let (rest, version) = match rest.rsplit_once('@') {
            Some((head, version)) => (head, Some(decode(version)?).filter(|v| !v.is_empty())),
            None => (rest, None),
        };

        let (raw_type, path) = rest
            .split_once('/')
            .ok_or_else(|| PurlError::MissingType(input.to_string()))?;
        let purl_type = validate_type(raw_type, input)?;

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let raw_name = segments
            .pop()
            .ok_or_else(|| PurlError::MissingName(input.to_string()))?;
        let name = decode(raw_name)?;
        if name.is_empty() {
            return Err(PurlError::MissingName(input.to_string()));
        }

        let namespace = if segments.is_empty() {
            None
        } else {
            let decoded = segments
                .iter()
                .map(|s| decode(s))
                .collect::<Result<Vec<_>, _>>()?;
            Some(decoded.join("/"))
        };

        Ok(Self {
            purl_type,
            namespace,
            name,
            version,
            qualifiers,
            subpath,
        })
    }

    /// Package type, e.g. `maven` or `npm` (lower-case)
    pub fn purl_type(&self) -> &str {
        &self.purl_type
    }

    /// Decoded namespace; multiple segments are joined with `/`
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Namespace split into its `/`-separated segments
    pub fn namespace_segments(&self) -> Vec<&str> {
        self.namespace
            .as_deref()
            .map(|ns| ns.split('/').collect())
            .unwrap_or_default()
    }

    /// Decoded package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Qualifiers, keys lower-cased
    pub fn qualifiers(&self) -> &BTreeMap<String, String> {
        &self.qualifiers
    }

    /// Look up a single qualifier
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers.get(key).map(String::as_str)
    }

    /// Subpath within the package, if any
    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Return a copy with an extra qualifier
    pub fn with_qualifier(mut self, key: &str, value: &str) -> Self {
        self.qualifiers
            .insert(key.to_ascii_lowercase(), value.to_string());
        self
    }
}

impl FromStr for PackageIdentifier {
    type Err = PurlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/", PURL_SCHEME, self.purl_type)?;
        if let Some(ns) = &self.namespace {
            for segment in ns.split('/') {
                write!(f, "{}/", utf8_percent_encode(segment, COMPONENT_SET))?;
            }
        }
        write!(f, "{}", utf8_percent_encode(&self.name, COMPONENT_SET))?;
        if let Some(version) = &self.version {
            write!(f, "@{}", utf8_percent_encode(version, COMPONENT_SET))?;
        }
        if !self.qualifiers.is_empty() {
            let query: Vec<String> = self
                .qualifiers
                .iter()
                .map(|(k, v)| format!("{}={}", k, utf8_percent_encode(v, COMPONENT_SET)))
                .collect();
            write!(f, "?{}", query.join("&"))?;
        }
        if let Some(subpath) = &self.subpath {
            write!(f, "#{}", subpath)?;
        }
        Ok(())
    }
}

fn validate_type(raw: &str, input: &str) -> Result<String, PurlError> {
    if raw.is_empty() {
        return Err(PurlError::MissingType(input.to_string()));
    }
    let lowered = raw.to_ascii_lowercase();
    let valid_chars = lowered
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    let starts_with_digit = lowered.chars().next().is_some_and(|c| c.is_ascii_digit());
    if !valid_chars || starts_with_digit {
        return Err(PurlError::InvalidType(raw.to_string()));
    }
    Ok(lowered)
}

fn decode(raw: &str) -> Result<String, PurlError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| PurlError::InvalidEncoding(raw.to_string()))
}

fn decode_subpath(raw: &str) -> Result<Option<String>, PurlError> {
    let segments = raw
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(decode)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    })
}

fn parse_qualifiers(query: &str) -> Result<BTreeMap<String, String>, PurlError> {
    let mut qualifiers = BTreeMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode(value)?;
        if key.is_empty() || value.is_empty() {
            continue;
        }
        qualifiers.insert(key.to_ascii_lowercase(), value);
    }
    Ok(qualifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maven() {
        let id = PackageIdentifier::parse("pkg:maven/com.someorg/someprod@4.5.35").unwrap();
        assert_eq!(id.purl_type(), "maven");
        assert_eq!(id.namespace(), Some("com.someorg"));
        assert_eq!(id.name(), "someprod");
        assert_eq!(id.version(), Some("4.5.35"));
        assert!(id.qualifiers().is_empty());
    }

    #[test]
    fn test_parse_npm_scoped() {
        let id = PackageIdentifier::parse("pkg:npm/%40somenamespace/package@4.5.35").unwrap();
        assert_eq!(id.namespace(), Some("@somenamespace"));
        assert_eq!(id.name(), "package");
    }

    #[test]
    fn test_type_is_lowercased() {
        let id = PackageIdentifier::parse("pkg:PyPI/Django@1.11.1").unwrap();
        assert_eq!(id.purl_type(), "pypi");
        assert_eq!(id.name(), "Django");
    }

    #[test]
    fn test_parse_qualifiers_and_subpath() {
        let id = PackageIdentifier::parse(
            "pkg:maven/org.apache/commons-io@2.6?Classifier=sources&type=jar#src/main",
        )
        .unwrap();
        assert_eq!(id.qualifier("classifier"), Some("sources"));
        assert_eq!(id.qualifier("type"), Some("jar"));
        assert_eq!(id.subpath(), Some("src/main"));
    }

    #[test]
    fn test_parse_without_version() {
        let id = PackageIdentifier::parse("pkg:cargo/serde").unwrap();
        assert_eq!(id.name(), "serde");
        assert_eq!(id.version(), None);
        assert_eq!(id.namespace(), None);
    }

    #[test]
    fn test_missing_scheme() {
        let err = PackageIdentifier::parse("maven/com.x/y@1").unwrap_err();
        assert!(matches!(err, PurlError::MissingScheme(_)));
    }

    #[test]
    fn test_missing_name() {
        assert!(matches!(
            PackageIdentifier::parse("pkg:npm/"),
            Err(PurlError::MissingName(_))
        ));
        assert!(matches!(
            PackageIdentifier::parse("pkg:npm"),
            Err(PurlError::MissingType(_))
        ));
    }

    #[test]
    fn test_invalid_type() {
        assert!(matches!(
            PackageIdentifier::parse("pkg:1abc/x@1"),
            Err(PurlError::InvalidType(_))
        ));
    }

    #[test]
    fn test_invalid_encoding() {
        assert!(matches!(
            PackageIdentifier::parse("pkg:npm/%FF%FE@1.0.0"),
            Err(PurlError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_display_encodes_scope() {
        let id = PackageIdentifier::parse("pkg:npm/%40angular/core@16.0.0").unwrap();
        assert_eq!(id.to_string(), "pkg:npm/%40angular/core@16.0.0");
    }
}
