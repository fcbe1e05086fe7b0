//! License URL guessing
//!
//! When an authoritative license URL yields nothing useful (typically a
//! GitHub page rendering HTML around the text), [`LicenseUrlGuesser`]
//! rewrites it into something that serves the raw file:
//!
//! 1. `github.com/<o>/<r>/blob/...` and `.../raw/...` become
//!    `raw.githubusercontent.com/<o>/<r>/...`.
//! 2. `.../tree/...` loses the `tree` segment and is guessed again.
//! 3. Any other `github.com` URL is treated as a repository root: the raw
//!    host is combined with a `master` branch segment and each name in
//!    [`LICENSE_FILE_CANDIDATES`] is probed until one has content.
//! 4. Otherwise the URL is returned unchanged.
//!
//! Only the `master` branch is tried; repositories on `main` are not found
//! by step 3.
//!
//! Every rewrite and probe is appended to the audit trail returned with
//! the result.

use crate::cache::ContentProvider;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Host serving raw repository files
pub const RAW_GITHUB_HOST: &str = "raw.githubusercontent.com";

/// Branch assumed when probing a repository root
pub const DEFAULT_BRANCH: &str = "master";

/// File names probed under a repository root, in order
pub const LICENSE_FILE_CANDIDATES: [&str; 14] = [
    "LICENSE",
    "License",
    "license",
    "LICENSE.md",
    "LICENSE.txt",
    "license.html",
    "license.txt",
    "COPYING",
    "LICENSE-MIT",
    "LICENSE-MIT.txt",
    "README.md",
    "Readme.md",
    "readme.md",
    "README.markdown",
];

/// Outcome of a guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessResult {
    /// Best URL found; the input itself when nothing better was found
    pub guessed_url: Option<String>,

    /// One line per rewrite or probe, in order
    pub audit_trail: String,
}

impl GuessResult {
    /// Whether the guessed URL differs from `original`
    pub fn changed(&self, original: &str) -> bool {
        self.guessed_url.as_deref().is_some_and(|g| g != original)
    }
}

#[derive(Default)]
struct AuditTrail(Vec<String>);

impl AuditTrail {
    fn push(&mut self, entry: String) {
        debug!(entry = %entry, "license url guess");
        self.0.push(entry);
    }

    fn finish(self) -> String {
        self.0.join("\n")
    }
}

/// Heuristic resolver for license URLs
pub struct LicenseUrlGuesser {
    probe: Arc<dyn ContentProvider>,
}

impl LicenseUrlGuesser {
    /// Create a guesser probing candidates through `probe`
    pub fn new(probe: Arc<dyn ContentProvider>) -> Self {
        Self { probe }
    }

    /// Guess a better URL for `url`
    pub fn guess(&self, url: &str) -> GuessResult {
        let mut trail = AuditTrail::default();
        let original = url.trim();
        if original.is_empty() {
            trail.push("No URL given".to_string());
            return GuessResult {
                guessed_url: None,
                audit_trail: trail.finish(),
            };
        }

        let normalized = normalize_repository_url(original, &mut trail);
        let guessed = match self.guess_from(&normalized, &mut trail) {
            Some(guessed) => guessed,
            None => {
                trail.push(format!("Keeping original URL {}", original));
                original.to_string()
            }
        };

        GuessResult {
            guessed_url: Some(guessed),
            audit_trail: trail.finish(),
        }
    }

    /// Apply the rewrite rules; `None` when no rule produced a URL
    fn guess_from(&self, url: &str, trail: &mut AuditTrail) -> Option<String> {
        let Some(parsed) = parse_github(url) else {
            trail.push(format!("No GitHub rule applies to {}", url));
            return None;
        };
        let segments = path_segments(&parsed);
        if segments.len() < 2 {
            trail.push(format!("Not a repository URL: {}", url));
            return None;
        }

        match segments.get(2).map(String::as_str) {
            Some(marker @ ("blob" | "raw")) => {
                let mut rest = segments.clone();
                rest.remove(2);
                let rewritten = with_raw_host(&parsed, &rest)?;
                trail.push(format!(
                    "Rewrote GitHub {} link {} to {}",
                    marker, url, rewritten
                ));
                Some(rewritten)
            }
            Some("tree") => {
                let mut rest = segments.clone();
                rest.remove(2);
                let mut stripped = parsed.clone();
                stripped.set_path(&rest.join("/"));
                let stripped = stripped.to_string();
                trail.push(format!("Stripped tree segment: {} -> {}", url, stripped));
                self.guess_from(&stripped, trail)
            }
            _ => self.search_repository(&parsed, &segments, trail),
        }
    }

    /// Probe conventional license file names under a repository root
    fn search_repository(
        &self,
        parsed: &Url,
        segments: &[String],
        trail: &mut AuditTrail,
    ) -> Option<String> {
        // Query and fragment belong to the repository page, not to its files
        let mut root = parsed.clone();
        root.set_query(None);
        root.set_fragment(None);

        let mut base_segments = segments.to_vec();
        if !base_segments.iter().any(|s| s == DEFAULT_BRANCH) {
            base_segments.push(DEFAULT_BRANCH.to_string());
        }

        for candidate in LICENSE_FILE_CANDIDATES {
            let mut candidate_segments = base_segments.clone();
            candidate_segments.push(candidate.to_string());
            let Some(candidate_url) = with_raw_host(&root, &candidate_segments) else {
                continue;
            };

            trail.push(format!("Searching for license: {}", candidate_url));
            match self.probe.content_for(&candidate_url) {
                Some(content) if !content.trim().is_empty() => {
                    trail.push(format!("Found license file at {}", candidate_url));
                    return Some(
                        self.guess_from(&candidate_url, trail)
                            .unwrap_or(candidate_url),
                    );
                }
                _ => trail.push(format!("No content at {}", candidate_url)),
            }
        }

        trail.push(format!(
            "No license file found in repository {}",
            segments[..2].join("/")
        ));
        None
    }
}

/// Bring git-style repository references into `https://github.com/<o>/<r>` form
fn normalize_repository_url(url: &str, trail: &mut AuditTrail) -> String {
    let mut normalized = url.to_string();

    if let Some(rest) = normalized.strip_prefix("git+") {
        normalized = rest.to_string();
    }
    if let Some(rest) = normalized.strip_prefix("git@github.com:") {
        normalized = format!("https://github.com/{}", rest);
    }
    for scheme in ["git://", "ssh://git@", "http://"] {
        if let Some(rest) = normalized.strip_prefix(scheme) {
            if rest.starts_with("github.com/") || rest.starts_with("www.github.com/") {
                normalized = format!("https://{}", rest);
            }
        }
    }
    if let Some(rest) = normalized.strip_prefix("https://www.github.com/") {
        normalized = format!("https://github.com/{}", rest);
    }
    if normalized.starts_with("https://github.com/") {
        if let Some(stripped) = normalized.strip_suffix(".git") {
            normalized = stripped.to_string();
        }
        if let Some(stripped) = normalized.strip_suffix('/') {
            normalized = stripped.to_string();
        }
    }

    if normalized != url {
        trail.push(format!("Normalized {} to {}", url, normalized));
    }
    normalized
}

fn parse_github(url: &str) -> Option<Url> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host_str() {
        Some("github.com") | Some("www.github.com") => Some(parsed),
        _ => None,
    }
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn with_raw_host(url: &Url, segments: &[String]) -> Option<String> {
    let mut raw = url.clone();
    raw.set_scheme("https").ok()?;
    raw.set_host(Some(RAW_GITHUB_HOST)).ok()?;
    raw.set_path(&segments.join("/"));
    Some(raw.to_string())
}
