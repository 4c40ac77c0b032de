//! News sources the pipeline can fetch from.
//!
//! The pipeline only knows the [`NewsSource`] trait: five named operations,
//! each parameterized by language, country, and a result cap. What happens
//! behind them (HTTP, feed parsing, caching) is the implementation's
//! business.
//!
//! # Implementations
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Google News | [`google`] | RSS feeds from `news.google.com/rss` |

use crate::config::FetchParams;
use crate::models::Article;
use std::error::Error;

pub mod google;

pub use google::GoogleNews;

/// The five fetch operations a source entry can name.
///
/// Every operation returns at most `params.max_results` articles. An empty
/// list is a valid result and still gets written.
pub trait NewsSource {
    /// Top stories for the configured language and country.
    async fn get_top_news(&self, params: &FetchParams) -> Result<Vec<Article>, Box<dyn Error>>;

    /// Stories in a topic section (e.g. `WORLD`, `TECHNOLOGY`).
    async fn get_news_by_topic(
        &self,
        params: &FetchParams,
        topic: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>>;

    /// Keyword search.
    async fn get_news(
        &self,
        params: &FetchParams,
        keyword: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>>;

    /// Local stories for a city, region, or country name.
    async fn get_news_by_location(
        &self,
        params: &FetchParams,
        location: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>>;

    /// Stories published by a single site (e.g. `cnn.com`).
    async fn get_news_by_site(
        &self,
        params: &FetchParams,
        site: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>>;
}
