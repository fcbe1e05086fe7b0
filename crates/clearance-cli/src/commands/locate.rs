//! `clearance locate` — Resolve a package URL.

use clearance_core::{Config, PackageIdentifier, PackageLocator};

pub fn execute(config: &Config, purl: &str) -> anyhow::Result<()> {
    let id = PackageIdentifier::parse(purl)?;
    let locator = PackageLocator::from_config(&config.repositories);
    let location = locator.locate(&id)?;
    println!("{}", serde_json::to_string_pretty(&location)?);
    Ok(())
}
