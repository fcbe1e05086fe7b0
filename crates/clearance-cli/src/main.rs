//! Clearance CLI
//!
//! Resolves package URLs to download locations and fetches license texts
//! through the same cache chain the library uses for inventories.

mod commands;

use clap::{Parser, Subcommand};
use clearance_core::Config;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clearance")]
#[command(about = "Package URL resolution and license text fetching", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (clearance.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Never touch the network
    #[arg(long, global = true)]
    offline: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a package URL to its path and download URLs
    Locate {
        /// Package URL (e.g., "pkg:maven/org.slf4j/slf4j-api@2.0.9")
        purl: String,
    },

    /// Fetch a URL through the cache chain and print its content
    Fetch {
        /// URL, optionally with a #L<start>-L<end> line range
        url: String,
    },

    /// Guess a better license URL for a GitHub link
    Guess {
        /// License or repository URL
        url: String,
    },

    /// Resolve a package URL and fetch its license text
    Enrich {
        /// Package URL
        purl: String,
        /// Declared license URL
        #[arg(short, long)]
        license_url: Option<String>,
        /// Include the license text in the output
        #[arg(long)]
        text: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>, offline: bool) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if offline {
        config.cache.skip_download = true;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_ref(), cli.offline)?;

    match cli.command {
        Commands::Locate { purl } => commands::locate::execute(&config, &purl),
        Commands::Fetch { url } => commands::fetch::execute(&config, &url),
        Commands::Guess { url } => commands::guess::execute(&config, &url),
        Commands::Enrich {
            purl,
            license_url,
            text,
        } => commands::enrich::execute(&config, &purl, license_url.as_deref(), text),
    }
}
