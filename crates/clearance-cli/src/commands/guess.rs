//! `clearance guess` — Guess a license URL.

use clearance_core::{CascadingCache, Config, LicenseUrlGuesser};
use std::sync::Arc;

pub fn execute(config: &Config, url: &str) -> anyhow::Result<()> {
    let cache = Arc::new(CascadingCache::from_config(config)?);
    let guesser = LicenseUrlGuesser::new(cache);
    let result = guesser.guess(url);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
