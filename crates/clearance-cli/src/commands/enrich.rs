//! `clearance enrich` — Resolve a component and fetch its license text.

use clearance_core::{ComponentRequest, Config, Enricher};
use serde_json::json;

pub fn execute(
    config: &Config,
    purl: &str,
    license_url: Option<&str>,
    include_text: bool,
) -> anyhow::Result<()> {
    let enricher = Enricher::from_config(config)?;
    let component = enricher.enrich(&ComponentRequest::new(Some(purl), license_url))?;

    let mut output = serde_json::to_value(&component)?;
    if include_text {
        let text = enricher.pool().retrieve(&component.license_text_key)?;
        output["license_text"] = json!(text.as_deref());
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
