//! Google News RSS client.
//!
//! Every operation maps to a feed under `https://news.google.com/rss`:
//!
//! | Operation | Feed path |
//! |-----------|-----------|
//! | top news | `/` |
//! | topic | `/headlines/section/topic/<TOPIC>` (known sections) or `/topics/<id>` |
//! | keyword | `/search?q=<keyword>` |
//! | location | `/headlines/section/geo/<location>` |
//! | site | `/search?q=site:<site>` |
//!
//! and carries the edition query `hl=<lang>&gl=<country>&ceid=<country>:<lang>`.

use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::NewsSource;
use crate::config::FetchParams;
use crate::models::{Article, Publisher};

const BASE_URL: &str = "https://news.google.com/rss";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Section topics Google News exposes under `/headlines/section/topic/`.
const KNOWN_TOPICS: [&str; 8] = [
    "WORLD",
    "NATION",
    "BUSINESS",
    "TECHNOLOGY",
    "ENTERTAINMENT",
    "SPORTS",
    "SCIENCE",
    "HEALTH",
];

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}

/// `<source url="https://www.reuters.com">Reuters</source>`
#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "@url", default)]
    url: Option<String>,
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

impl Item {
    fn into_article(self) -> Article {
        let publisher = self
            .source
            .map(|s| Publisher {
                href: s.url.unwrap_or_default(),
                title: s.name.unwrap_or_default(),
            })
            .unwrap_or_default();

        Article {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            published_date: self.pub_date.unwrap_or_default(),
            url: self.link.unwrap_or_default(),
            publisher,
        }
    }
}

/// Parse a Google News RSS document, keeping at most `max_results` items.
pub fn parse_feed(xml: &str, max_results: usize) -> Result<Vec<Article>, quick_xml::DeError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .take(max_results)
        .map(Item::into_article)
        .collect())
}

/// Google News RSS client.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: Client,
    base_url: String,
}

impl GoogleNews {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_base_url(BASE_URL)
    }

    /// Client against another feed root, e.g. a local server in tests.
    pub(crate) fn with_base_url(base_url: &str) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a feed URL. `path` may already carry a query string.
    fn feed_url(&self, path: &str, params: &FetchParams) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}hl={}&gl={}&ceid={}:{}",
            self.base_url,
            path,
            separator,
            params.language,
            params.country,
            params.country,
            params.language
        )
    }

    fn topic_path(topic: &str) -> String {
        let upper = topic.to_uppercase();
        if KNOWN_TOPICS.contains(&upper.as_str()) {
            format!("/headlines/section/topic/{upper}")
        } else {
            format!("/topics/{}", urlencoding::encode(topic))
        }
    }

    fn search_path(query: &str) -> String {
        format!("/search?q={}", urlencoding::encode(query))
    }

    fn location_path(location: &str) -> String {
        format!("/headlines/section/geo/{}", urlencoding::encode(location))
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_feed(&self, url: &str, max_results: usize) -> Result<Vec<Article>, Box<dyn Error>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("Google News returned status {status}").into());
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched feed");
        let articles = parse_feed(&body, max_results)?;
        info!(count = articles.len(), "Parsed Google News feed");
        Ok(articles)
    }
}

impl NewsSource for GoogleNews {
    async fn get_top_news(&self, params: &FetchParams) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = self.feed_url("", params);
        self.fetch_feed(&url, params.max_results).await
    }

    async fn get_news_by_topic(
        &self,
        params: &FetchParams,
        topic: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = self.feed_url(&Self::topic_path(topic), params);
        self.fetch_feed(&url, params.max_results).await
    }

    async fn get_news(
        &self,
        params: &FetchParams,
        keyword: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = self.feed_url(&Self::search_path(keyword), params);
        self.fetch_feed(&url, params.max_results).await
    }

    async fn get_news_by_location(
        &self,
        params: &FetchParams,
        location: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        let url = self.feed_url(&Self::location_path(location), params);
        self.fetch_feed(&url, params.max_results).await
    }

    async fn get_news_by_site(
        &self,
        params: &FetchParams,
        site: &str,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        self.get_news(params, &format!("site:{site}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>Top stories - Google News</title>
    <link>https://news.google.com/?hl=en-US&amp;gl=US&amp;ceid=US:en</link>
    <language>en-US</language>
    <item>
      <title>Markets rally on rate news - Reuters</title>
      <link>https://news.google.com/rss/articles/abc?oc=5</link>
      <guid isPermaLink="false">abc</guid>
      <pubDate>Mon, 06 May 2025 14:30:00 GMT</pubDate>
      <description>&lt;a href="https://news.google.com/rss/articles/abc"&gt;Markets rally&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Reuters&lt;/font&gt;</description>
      <source url="https://www.reuters.com">Reuters</source>
    </item>
    <item>
      <title>Fête de la musique - Le Monde</title>
      <link>https://news.google.com/rss/articles/def?oc=5</link>
      <pubDate>Tue, 07 May 2025 08:00:00 GMT</pubDate>
      <description>Fête</description>
      <source url="https://www.lemonde.fr">Le Monde</source>
    </item>
    <item>
      <title>Third story</title>
      <link>https://news.google.com/rss/articles/ghi?oc=5</link>
    </item>
  </channel>
</rss>"##;

    fn client() -> GoogleNews {
        GoogleNews::new().unwrap()
    }

    /// Serve a single canned HTTP response on a local port; returns the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/rss+xml\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/rss")
    }

    #[tokio::test]
    async fn test_fetch_feed_rejects_non_success_status() {
        let base = serve_once("503 Service Unavailable", "").await;
        let source = GoogleNews::with_base_url(&base).unwrap();

        let err = source
            .get_top_news(&FetchParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_fetch_feed_parses_served_feed() {
        let base = serve_once("200 OK", FEED).await;
        let source = GoogleNews::with_base_url(&base).unwrap();
        let params = FetchParams {
            max_results: 2,
            ..FetchParams::default()
        };

        let articles = source.get_top_news(&params).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].publisher.title, "Reuters");
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let source = GoogleNews::with_base_url("http://127.0.0.1:1/rss/").unwrap();
        assert_eq!(
            source.feed_url("", &FetchParams::default()),
            "http://127.0.0.1:1/rss?hl=en&gl=US&ceid=US:en"
        );
    }

    #[test]
    fn test_parse_feed_maps_items() {
        let articles = parse_feed(FEED, 99).unwrap();
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.title, "Markets rally on rate news - Reuters");
        assert_eq!(first.url, "https://news.google.com/rss/articles/abc?oc=5");
        assert_eq!(first.published_date, "Mon, 06 May 2025 14:30:00 GMT");
        assert!(first.description.starts_with("<a href="));
        assert_eq!(first.publisher.href, "https://www.reuters.com");
        assert_eq!(first.publisher.title, "Reuters");

        assert_eq!(articles[1].title, "Fête de la musique - Le Monde");
        assert_eq!(articles[2].publisher, Publisher::default());
        assert_eq!(articles[2].description, "");
    }

    #[test]
    fn test_parse_feed_respects_max_results() {
        assert_eq!(parse_feed(FEED, 2).unwrap().len(), 2);
        assert!(parse_feed(FEED, 0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_without_items() {
        let xml = "<rss><channel><title>Empty</title></channel></rss>";
        assert!(parse_feed(xml, 10).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<html><body>blocked</body></html>", 10).is_err());
    }

    #[test]
    fn test_top_news_url() {
        let url = client().feed_url("", &FetchParams::default());
        assert_eq!(url, "https://news.google.com/rss?hl=en&gl=US&ceid=US:en");
    }

    #[test]
    fn test_topic_urls() {
        let params = FetchParams {
            language: "fr".to_string(),
            country: "FR".to_string(),
            max_results: 5,
        };
        let known = client().feed_url(&GoogleNews::topic_path("world"), &params);
        assert_eq!(
            known,
            "https://news.google.com/rss/headlines/section/topic/WORLD?hl=fr&gl=FR&ceid=FR:fr"
        );

        let custom = GoogleNews::topic_path("CAAqJggKIiBDQkFTRWdvSUwyMHZNRGx1YlY4U0FtVnVHZ0pWVXlnQVAB");
        assert_eq!(
            custom,
            "/topics/CAAqJggKIiBDQkFTRWdvSUwyMHZNRGx1YlY4U0FtVnVHZ0pWVXlnQVAB"
        );
    }

    #[test]
    fn test_search_and_location_urls() {
        let params = FetchParams::default();
        let search = client().feed_url(&GoogleNews::search_path("site:cnn.com"), &params);
        assert_eq!(
            search,
            "https://news.google.com/rss/search?q=site%3Acnn.com&hl=en&gl=US&ceid=US:en"
        );

        let geo = client().feed_url(&GoogleNews::location_path("New York"), &params);
        assert_eq!(
            geo,
            "https://news.google.com/rss/headlines/section/geo/New%20York?hl=en&gl=US&ceid=US:en"
        );
    }
}
