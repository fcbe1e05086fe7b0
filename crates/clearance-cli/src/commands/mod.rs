//! CLI command implementations

pub mod enrich;
pub mod fetch;
pub mod guess;
pub mod locate;
