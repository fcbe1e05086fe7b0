//! Component enrichment
//!
//! [`Enricher`] is the per-run context tying the pipeline together: a
//! component's package URL goes through the [`PackageLocator`], its license
//! URL through the [`CascadingCache`] (and the [`LicenseUrlGuesser`] when
//! the cache yields nothing), and the license text is interned in the run's
//! [`TextPool`].
//!
//! Everything that only makes a component less complete degrades to an
//! absent field. Path injection and pool inconsistencies are returned as
//! [`EnrichError`] for the affected component only.

use crate::cache::{CascadingCache, ContentProvider, LogOnce};
use crate::config::Config;
use crate::fetch::FetchError;
use crate::guess::LicenseUrlGuesser;
use crate::locator::{LocatorError, PackageLocation, PackageLocator};
use crate::pool::{PoolError, TextPool};
use crate::purl::PackageIdentifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort enrichment of a single component
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Integrity failure while resolving the package location
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Text pool does not hold a key it just produced
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// One inventory entry to enrich
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRequest {
    pub purl: Option<String>,
    pub license_url: Option<String>,
}

impl ComponentRequest {
    pub fn new(purl: Option<&str>, license_url: Option<&str>) -> Self {
        Self {
            purl: purl.map(String::from),
            license_url: license_url.map(String::from),
        }
    }
}

/// Result of enriching one entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichedComponent {
    /// Canonical form of the parsed package URL
    pub identifier: Option<String>,
    pub package_path: Option<String>,
    pub source_download_url: Option<String>,
    pub package_download_url: Option<String>,
    pub source_archive_suffix: Option<String>,

    /// URL the license text was actually read from
    pub license_url: Option<String>,

    /// [`TextPool`] key of the license text
    pub license_text_key: String,

    /// Guesser audit trail, present when guessing was attempted
    pub audit_trail: Option<String>,
}

impl EnrichedComponent {
    fn apply_location(&mut self, location: PackageLocation) {
        self.package_path = Some(location.path);
        self.source_download_url = location.source_download_url;
        self.package_download_url = location.package_download_url;
        self.source_archive_suffix = Some(location.source_archive_suffix);
    }
}

struct LicenseLookup {
    url: Option<String>,
    text: Option<String>,
    audit_trail: Option<String>,
}

/// Per-run enrichment context
pub struct Enricher {
    locator: PackageLocator,
    cache: Arc<CascadingCache>,
    guesser: LicenseUrlGuesser,
    pool: Arc<TextPool>,
    unresolved_types: LogOnce,
    workers: usize,
}

impl Enricher {
    /// Create a context from explicit parts
    pub fn new(
        locator: PackageLocator,
        cache: Arc<CascadingCache>,
        pool: Arc<TextPool>,
        workers: usize,
    ) -> Self {
        let probe: Arc<dyn ContentProvider> = cache.clone();
        Self {
            locator,
            cache,
            guesser: LicenseUrlGuesser::new(probe),
            pool,
            unresolved_types: LogOnce::default(),
            workers: workers.max(1),
        }
    }

    /// Create a context with the standard cache chain and a fresh pool
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::new(
            PackageLocator::from_config(&config.repositories),
            Arc::new(CascadingCache::from_config(config)?),
            Arc::new(TextPool::new()),
            config.fetch.workers,
        ))
    }

    pub fn pool(&self) -> &Arc<TextPool> {
        &self.pool
    }

    pub fn cache(&self) -> &CascadingCache {
        &self.cache
    }

    pub fn locator(&self) -> &PackageLocator {
        &self.locator
    }

    /// Enrich a single entry
    pub fn enrich(&self, request: &ComponentRequest) -> Result<EnrichedComponent, EnrichError> {
        let mut component = EnrichedComponent::default();

        if let Some(id) = request.purl.as_deref().and_then(|raw| self.parse_purl(raw)) {
            component.identifier = Some(id.to_string());
            if let Some(location) = self.locate(&id)? {
                component.apply_location(location);
            }
        }

        // License text, interned
        let license = self.license_text(request.license_url.as_deref());
        component.license_url = license.url;
        component.audit_trail = license.audit_trail;
        component.license_text_key = self.pool.store(license.text.as_deref());
        self.pool.retrieve(&component.license_text_key)?;

        Ok(component)
    }

    /// Enrich a batch on at most `workers` threads, preserving order
    pub fn enrich_all(
        &self,
        requests: &[ComponentRequest],
    ) -> Vec<Result<EnrichedComponent, EnrichError>> {
        if requests.is_empty() {
            return Vec::new();
        }
        let workers = self.workers.min(requests.len());
        debug!(count = requests.len(), workers, "enriching components");

        let (job_tx, job_rx) = crossbeam::channel::unbounded();
        let (result_tx, result_rx) = crossbeam::channel::unbounded();
        for job in requests.iter().enumerate() {
            // receiver is alive until the scope below ends
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let scoped = crossbeam::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move |_| {
                    for (index, request) in job_rx.iter() {
                        let _ = result_tx.send((index, self.enrich(request)));
                    }
                });
            }
        });
        if let Err(panic) = scoped {
            std::panic::resume_unwind(panic);
        }
        drop(result_tx);

        // Restore input order
        let mut slots: Vec<Option<Result<EnrichedComponent, EnrichError>>> =
            std::iter::repeat_with(|| None).take(requests.len()).collect();
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }

    fn parse_purl(&self, raw: &str) -> Option<PackageIdentifier> {
        match PackageIdentifier::parse(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                info!(purl = raw, error = %e, "malformed package URL, skipping enrichment");
                None
            }
        }
    }

    fn locate(&self, id: &PackageIdentifier) -> Result<Option<PackageLocation>, EnrichError> {
        match self.locator.locate(id) {
            Ok(location) => Ok(Some(location)),
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(LocatorError::NoApplicableResolver { purl_type }) => {
                if self.unresolved_types.first(&purl_type) {
                    info!(purl_type = %purl_type, "no resolver for package type");
                }
                Ok(None)
            }
            Err(e) => {
                debug!(purl = %id, error = %e, "package location unavailable");
                Ok(None)
            }
        }
    }

    fn license_text(&self, url: Option<&str>) -> LicenseLookup {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return LicenseLookup {
                url: None,
                text: None,
                audit_trail: None,
            };
        };

        if let Some(text) = self.cache.get(url) {
            return LicenseLookup {
                url: Some(url.to_string()),
                text: Some(text),
                audit_trail: None,
            };
        }

        // Authoritative URL gave nothing; try a guessed one
        let guess = self.guesser.guess(url);
        let guessed = guess.guessed_url.filter(|g| g != url);
        let text = guessed.as_deref().and_then(|g| self.cache.get(g));
        let url = match (&text, guessed) {
            (Some(_), Some(guessed)) => guessed,
            _ => url.to_string(),
        };
        if text.is_none() {
            debug!(url = %url, "no license text found");
        }

        LicenseLookup {
            url: Some(url),
            text,
            audit_trail: Some(guess.audit_trail),
        }
    }
}
