//! # News JSON Fetcher
//!
//! A batch job that reads a JSON configuration, fetches the Google News
//! feeds it describes, and writes each result as a static JSON file that a
//! GitHub Pages site (or anything else) can download.
//!
//! ## Usage
//!
//! ```sh
//! news_json_fetcher                      # ./config.json -> ./docs/data
//! news_json_fetcher -c config.json -o docs/data
//! ```
//!
//! ## Pipeline
//!
//! 1. **Config**: load the root config (multi-app or legacy single-app)
//! 2. **Dispatch**: for each app, call the news operation each entry names
//! 3. **Output**: write `<output>/<app>/<normalized filename>`
//! 4. **Manifest**: write `<output>/<app>/config.json` with raw GitHub URLs
//!
//! Failures are logged at entry or app granularity; the process always exits
//! successfully.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod gnews;
mod models;
mod outputs;
mod pipeline;
mod transform;
mod utils;

use cli::Cli;
use config::load_root_config;
use gnews::GoogleNews;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_json_fetcher starting up");

    let args = Cli::parse();
    debug!(config = %args.config.display(), output_dir = %args.output_dir.display(), "Parsed CLI arguments");

    let Some(root) = load_root_config(&args.config).await else {
        warn!(path = %args.config.display(), "No configuration found or empty config file; nothing to do");
        return Ok(());
    };

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Ok(());
    }

    let source = match GoogleNews::new() {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return Ok(());
        }
    };

    let reports = pipeline::run(&root, &args.output_dir, &source).await;

    for report in &reports {
        info!(
            app_name = %report.app_name,
            written = report.written.len(),
            skipped = report.skipped,
            failed = report.failed,
            manifest = report.manifest.is_some(),
            "App finished"
        );
    }

    let written: usize = reports.iter().map(|r| r.written.len()).sum();
    let skipped: usize = reports.iter().map(|r| r.skipped).sum();
    let failed: usize = reports.iter().map(|r| r.failed).sum();
    let elapsed = start_time.elapsed();
    info!(
        apps = reports.len(),
        written,
        skipped,
        failed,
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
