//! `clearance fetch` — Print the content behind a URL.

use anyhow::bail;
use clearance_core::{CascadingCache, Config};

pub fn execute(config: &Config, url: &str) -> anyhow::Result<()> {
    let cache = CascadingCache::from_config(config)?;
    match cache.get(url) {
        Some(content) => {
            print!("{}", content);
            Ok(())
        }
        None => bail!("No content for {}", url),
    }
}
