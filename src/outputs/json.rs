//! JSON file writers for article lists and manifests.
//!
//! # Output Structure
//!
//! ```text
//! output_root/
//! └── <app_name>/
//!     ├── top.json       # one array per source entry
//!     ├── world.json
//!     └── config.json    # manifest
//! ```
//!
//! Files are UTF-8, indented with two spaces, and keep non-ASCII characters
//! as-is. Every write replaces the previous file completely.

use crate::models::{Article, Manifest};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Name of the manifest file inside each app folder.
pub const MANIFEST_FILENAME: &str = "config.json";

async fn write_pretty<T: Serialize + ?Sized>(
    dir: &Path,
    filename: &str,
    value: &T,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;

    if let Err(e) = fs::create_dir_all(dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = dir.join(filename);
    fs::write(&path, json).await?;
    Ok(path)
}

/// Write an article list to `{app_dir}/{filename}`.
///
/// # Returns
///
/// The path that was written.
#[instrument(level = "info", skip_all, fields(app_dir = %app_dir.display(), %filename))]
pub async fn write_articles(
    app_dir: &Path,
    filename: &str,
    articles: &[Article],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = write_pretty(app_dir, filename, articles).await?;
    info!(count = articles.len(), path = %path.display(), "Saved articles");
    Ok(path)
}

/// Write the manifest to `{app_dir}/config.json`.
#[instrument(level = "info", skip_all, fields(app_dir = %app_dir.display()))]
pub async fn write_manifest(app_dir: &Path, manifest: &Manifest) -> Result<PathBuf, Box<dyn Error>> {
    let path = write_pretty(app_dir, MANIFEST_FILENAME, manifest).await?;
    info!(
        entries = manifest.raw_urls.len(),
        path = %path.display(),
        "Wrote manifest"
    );
    Ok(path)
}
