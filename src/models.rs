//! Data models for fetched articles and the published manifest.
//!
//! - [`Article`]: one news item as returned by a [`NewsSource`](crate::gnews::NewsSource)
//! - [`Publisher`]: the outlet an article was published by
//! - [`Manifest`]: per-app index of raw URLs for the published JSON files
//!
//! Articles are written through exactly as the news source returns them; the
//! pipeline never inspects their fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single news article.
///
/// The field names mirror the JSON consumed by the static site that reads
/// these files, hence the space in `"published date"`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// The article headline.
    pub title: String,
    /// Feed-provided description (an HTML fragment for Google News).
    pub description: String,
    /// Publication timestamp as given by the feed (RFC 2822).
    #[serde(rename = "published date")]
    pub published_date: String,
    /// Link to the article.
    pub url: String,
    /// The outlet that published the article.
    pub publisher: Publisher,
}

/// The outlet behind an [`Article`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Publisher {
    /// Homepage of the outlet.
    pub href: String,
    /// Display name of the outlet.
    pub title: String,
}

/// Per-app manifest written next to the article files.
///
/// `raw_urls` maps a file's base name (extension stripped) to the absolute
/// URL it can be downloaded from once the output folder is pushed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    pub app_name: String,
    pub repository: String,
    pub raw_urls: BTreeMap<String, String>,
}
