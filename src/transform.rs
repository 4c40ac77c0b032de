//! Filename normalization for published article files.
//!
//! Older configs named their outputs after the country they were fetched
//! for (`usa_top_news.json`, `country_top_news.json`). Published files drop
//! that noise: the leading country-like token and the trailing `_news` go,
//! leaving `top.json`.
//!
//! The country detection is a heuristic: any 2-10 letter lowercase first
//! token counts. That means distinct configured names can normalize to the
//! same file (`usa_top_news.json` and `uk_top_news.json` both become
//! `top.json`); whichever entry is written last wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

const JSON_SUFFIX: &str = ".json";
const NEWS_SUFFIX: &str = "_news";

/// Leading lowercase token followed by an underscore, e.g. `usa_`.
static COUNTRY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,10}_").expect("country prefix regex is valid"));

/// Normalize a configured filename into the name it is published under.
///
/// Returns `None` when the configured name does not end in a plain file
/// name (`/`, `dir/..`), since there is nothing safe to write inside the
/// app folder.
///
/// ```ignore
/// assert_eq!(normalize_filename("usa_top_news.json"), Some("top.json".to_string()));
/// assert_eq!(normalize_filename("headlines.json"), Some("headlines.json".to_string()));
/// assert_eq!(normalize_filename("out/.."), None);
/// ```
pub fn normalize_filename(filename: &str) -> Option<String> {
    // Only the final path component is ever used, and it must be a plain name.
    let name = match Path::new(filename).components().next_back()? {
        Component::Normal(name) => name.to_str()?,
        _ => return None,
    };

    let stem = name.strip_suffix(JSON_SUFFIX).unwrap_or(name);

    let without_country = match COUNTRY_PREFIX.find(stem) {
        Some(m) => &stem[m.end()..],
        None => stem,
    };

    let base = match without_country.strip_suffix(NEWS_SUFFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => without_country,
    };

    if base.is_empty() {
        return Some(format!("{stem}{JSON_SUFFIX}"));
    }
    Some(format!("{base}{JSON_SUFFIX}"))
}

/// The manifest key for a published filename: its base name without extension.
pub fn manifest_key(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}
