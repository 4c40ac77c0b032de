//! Manifest generation: raw download URLs for an app's published files.
//!
//! The output root is expected to be committed to a GitHub repository at
//! `docs/data`, so every written file becomes reachable at
//!
//! ```text
//! https://raw.githubusercontent.com/<org>/<repo>/main/docs/data/<app name>/<filename>
//! ```
//!
//! The app name is percent-encoded once; filenames are used as written.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};
use url::Url;

use super::json::write_manifest;
use crate::models::Manifest;
use crate::transform::manifest_key;

const RAW_HOST: &str = "https://raw.githubusercontent.com";
const PUBLISH_BRANCH: &str = "main";
const PUBLISHED_DATA_PATH: &str = "docs/data";

/// Why no manifest was produced for an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSkip {
    NothingWritten,
    /// Repository absent, blank, or without an `<org>/<repo>` path.
    NoRepository,
}

impl fmt::Display for ManifestSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSkip::NothingWritten => write!(f, "no files were written"),
            ManifestSkip::NoRepository => write!(f, "no repository configured"),
        }
    }
}

/// The `<org>/<repo>` part of a repository URL.
///
/// Takes the first two path segments of any URL (or of an scp-style
/// `git@host:org/repo` remote) and drops a trailing `.git`. The host is not
/// checked; raw URLs always point at GitHub.
pub fn repository_slug(repository: &str) -> String {
    let trimmed = repository.trim();
    let path = match Url::parse(trimmed) {
        Ok(url) if url.has_host() => url.path().to_string(),
        _ => trimmed
            .rsplit_once(':')
            .map_or(trimmed, |(_, path)| path)
            .to_string(),
    };

    let slug = path
        .split('/')
        .filter(|s| !s.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join("/");
    match slug.strip_suffix(".git") {
        Some(stripped) => stripped.to_string(),
        None => slug,
    }
}

fn is_github(repository: &str) -> bool {
    Url::parse(repository.trim())
        .ok()
        .and_then(|url| url.host_str().map(|h| h == "github.com" || h == "www.github.com"))
        .unwrap_or(false)
}

/// The raw-content URL a published file will be served from.
pub fn raw_url(slug: &str, app_name: &str, filename: &str) -> String {
    format!(
        "{RAW_HOST}/{slug}/{PUBLISH_BRANCH}/{PUBLISHED_DATA_PATH}/{}/{filename}",
        urlencoding::encode(app_name)
    )
}

/// Build the manifest for the files an app actually wrote.
///
/// Keys are the filenames without extension; the map is ordered, so the
/// serialized manifest lists them sorted.
pub fn build_manifest(
    app_name: &str,
    repository: Option<&str>,
    written: &[String],
) -> Result<Manifest, ManifestSkip> {
    if written.is_empty() {
        return Err(ManifestSkip::NothingWritten);
    }
    let repository = match repository.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Err(ManifestSkip::NoRepository),
    };
    let slug = repository_slug(repository);
    if slug.is_empty() {
        return Err(ManifestSkip::NoRepository);
    }

    let raw_urls = written
        .iter()
        .map(|filename| {
            (
                manifest_key(filename).to_string(),
                raw_url(&slug, app_name, filename),
            )
        })
        .collect();

    Ok(Manifest {
        app_name: app_name.to_string(),
        repository: repository.to_string(),
        raw_urls,
    })
}

/// Build and write the manifest for one app, logging why when it is skipped.
///
/// # Returns
///
/// The manifest path, or `None` if it was skipped or could not be written.
#[instrument(level = "info", skip_all, fields(%app_name))]
pub async fn generate_manifest(
    app_dir: &Path,
    app_name: &str,
    repository: Option<&str>,
    written: &[String],
) -> Option<PathBuf> {
    let manifest = match build_manifest(app_name, repository, written) {
        Ok(manifest) => {
            if !is_github(&manifest.repository) {
                warn!(repository = %manifest.repository, "Repository is not on github.com; raw URLs assume GitHub hosting");
            }
            manifest
        }
        Err(reason) => {
            warn!(%reason, "Skipping manifest generation");
            return None;
        }
    };

    match write_manifest(app_dir, &manifest).await {
        Ok(path) => {
            info!(path = %path.display(), "Manifest ready");
            Some(path)
        }
        Err(e) => {
            error!(error = %e, "Failed to write manifest");
            None
        }
    }
}
