//! The dispatch pipeline: configured entries in, JSON files out.
//!
//! Apps are processed one after another, and each app's entries strictly in
//! configuration order. Every entry is isolated: a skipped or failed entry is
//! logged and counted, and the loop moves on. Nothing here returns an error
//! to the caller; the worst outcome is an app that writes no files.

use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use crate::config::{load_app_config, AppConfig, FetchRequest, RootConfig, SourceEntry};
use crate::gnews::NewsSource;
use crate::models::Article;
use crate::outputs::json::{write_articles, MANIFEST_FILENAME};
use crate::outputs::manifest::generate_manifest;
use crate::transform::normalize_filename;

/// What happened while processing one app.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppReport {
    pub app_name: String,
    /// Normalized filenames written, first-write order, no duplicates.
    pub written: Vec<String>,
    /// Entries that never reached the news source.
    pub skipped: usize,
    /// Entries whose fetch or write failed.
    pub failed: usize,
    pub manifest: Option<PathBuf>,
}

/// Call the news source operation an entry names.
pub async fn fetch_entry<S: NewsSource>(
    source: &S,
    entry: &SourceEntry,
) -> Result<Vec<Article>, Box<dyn Error>> {
    let params = &entry.params;
    match &entry.request {
        FetchRequest::TopNews => source.get_top_news(params).await,
        FetchRequest::Topic { topic } => source.get_news_by_topic(params, topic).await,
        FetchRequest::Keyword { keyword } => source.get_news(params, keyword).await,
        FetchRequest::Location { location } => source.get_news_by_location(params, location).await,
        FetchRequest::Site { site } => source.get_news_by_site(params, site).await,
    }
}

/// App names become a single directory under the output root.
fn is_safe_app_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// Fetch one entry and write its articles. Returns the article count.
async fn run_entry<S: NewsSource>(
    source: &S,
    entry: &SourceEntry,
    app_dir: &Path,
    filename: &str,
) -> Result<usize, Box<dyn Error>> {
    let articles = fetch_entry(source, entry).await?;
    write_articles(app_dir, filename, &articles).await?;
    Ok(articles.len())
}

/// Process every entry of one app, then write its manifest.
#[instrument(level = "info", skip_all, fields(app_name = %app.app_name))]
pub async fn process_app<S: NewsSource>(
    app: &AppConfig,
    output_root: &Path,
    source: &S,
) -> AppReport {
    let mut report = AppReport {
        app_name: app.app_name.clone(),
        ..AppReport::default()
    };

    if !is_safe_app_name(&app.app_name) {
        error!(
            app_name = %app.app_name,
            "App name must be a non-empty single path component; skipping app"
        );
        report.skipped = app.news_sources.len();
        return report;
    }

    let app_dir = output_root.join(&app.app_name);
    info!(
        sources = app.news_sources.len(),
        app_dir = %app_dir.display(),
        "Processing app"
    );

    for (index, slot) in app.news_sources.iter().enumerate() {
        let entry = match slot {
            Ok(entry) => entry,
            Err(reason) => {
                warn!(index, %reason, "Skipping source entry");
                report.skipped += 1;
                continue;
            }
        };

        let Some(filename) = normalize_filename(&entry.filename) else {
            warn!(
                index,
                configured = %entry.filename,
                "Filename does not end in a plain file name; skipping"
            );
            report.skipped += 1;
            continue;
        };
        let function = entry.request.function_name();
        if filename == MANIFEST_FILENAME {
            warn!(
                index,
                configured = %entry.filename,
                "Entry would overwrite the manifest; skipping"
            );
            report.skipped += 1;
            continue;
        }

        match run_entry(source, entry, &app_dir, &filename).await {
            Ok(count) => {
                info!(index, function, %filename, count, "Entry complete");
                if !report.written.contains(&filename) {
                    report.written.push(filename);
                }
            }
            Err(e) => {
                error!(index, function, %filename, error = %e, "Error processing entry");
                report.failed += 1;
            }
        }
    }

    report.manifest = generate_manifest(
        &app_dir,
        &app.app_name,
        app.repository.as_deref(),
        &report.written,
    )
    .await;

    info!(
        written = report.written.len(),
        skipped = report.skipped,
        failed = report.failed,
        manifest = report.manifest.is_some(),
        "App finished"
    );
    report
}

/// Process everything the root configuration names.
///
/// Per-app files that cannot be loaded are logged and skipped.
#[instrument(level = "info", skip_all, fields(output_root = %output_root.display()))]
pub async fn run<S: NewsSource>(root: &RootConfig, output_root: &Path, source: &S) -> Vec<AppReport> {
    match root {
        RootConfig::Legacy(app) => vec![process_app(app, output_root, source).await],
        RootConfig::Apps(paths) => {
            let mut reports = Vec::with_capacity(paths.len());
            for path in paths {
                match load_app_config(path).await {
                    Some(app) => reports.push(process_app(&app, output_root, source).await),
                    None => warn!(path = %path.display(), "Skipping app: no usable config"),
                }
            }
            reports
        }
    }
}
