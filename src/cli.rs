//! Command-line interface definitions.
//!
//! Running with no arguments reads `config.json` from the working directory
//! and writes into `docs/data`.

use clap::Parser;
use std::path::PathBuf;

/// Fetch configured Google News feeds and publish them as JSON files.
///
/// # Examples
///
/// ```sh
/// # Defaults: ./config.json -> ./docs/data
/// news_json_fetcher
///
/// # Explicit paths
/// news_json_fetcher -c deploy/config.json -o site/docs/data
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root configuration file (multi-app `{"apps": [...]}` or a single app)
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Base directory for output; each app writes into its own subfolder
    #[arg(short, long, default_value = "docs/data")]
    pub output_dir: PathBuf,
}
