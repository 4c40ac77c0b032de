//! Loading and resolving the JSON configuration documents.
//!
//! Two root shapes are accepted:
//!
//! ```json
//! { "apps": ["apps/world.json", "apps/sports.json"] }
//! ```
//!
//! or the legacy single-app document, which is also the shape of every
//! per-app file:
//!
//! ```json
//! {
//!   "app_name": "demo",
//!   "repository": "https://github.com/org/repo",
//!   "news_sources": [
//!     { "function": "get_top_news", "filename": "usa_top_news.json" },
//!     { "function": "get_news_by_topic", "filename": "world.json", "topic": "WORLD" }
//!   ]
//! }
//! ```
//!
//! Both shapes end up as an in-memory [`AppConfig`]. Each source entry is
//! resolved into a [`FetchRequest`] as soon as the document is read, so the
//! pipeline never looks at loose extra keys.
//!
//! Loading fails soft: a missing, empty, or unreadable document is logged
//! and reported as `None`.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::utils::{looks_truncated, truncate_for_log};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_MAX_RESULTS: usize = 99;

/// Parameters shared by every fetch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub language: String,
    pub country: String,
    pub max_results: usize,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// One of the five fetch operations, carrying only the argument it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    TopNews,
    Topic { topic: String },
    Keyword { keyword: String },
    Location { location: String },
    Site { site: String },
}

impl FetchRequest {
    /// The configuration name of the operation.
    pub fn function_name(&self) -> &'static str {
        match self {
            FetchRequest::TopNews => "get_top_news",
            FetchRequest::Topic { .. } => "get_news_by_topic",
            FetchRequest::Keyword { .. } => "get_news",
            FetchRequest::Location { .. } => "get_news_by_location",
            FetchRequest::Site { .. } => "get_news_by_site",
        }
    }

    fn resolve(function: &str, extra: &Map<String, Value>) -> Result<Self, EntryError> {
        let missing = |function: &'static str, parameter: &'static str| {
            EntryError::MissingParameter { function, parameter }
        };

        match function {
            "get_top_news" => Ok(FetchRequest::TopNews),
            "get_news_by_topic" => extra_str(extra, "topic")
                .map(|topic| FetchRequest::Topic { topic })
                .ok_or_else(|| missing("get_news_by_topic", "topic")),
            "get_news" => extra_str(extra, "keyword")
                .or_else(|| extra_str(extra, "q"))
                .map(|keyword| FetchRequest::Keyword { keyword })
                .ok_or_else(|| missing("get_news", "keyword")),
            "get_news_by_location" => extra_str(extra, "location")
                .map(|location| FetchRequest::Location { location })
                .ok_or_else(|| missing("get_news_by_location", "location")),
            "get_news_by_site" => extra_str(extra, "site")
                .map(|site| FetchRequest::Site { site })
                .ok_or_else(|| missing("get_news_by_site", "site")),
            other => Err(EntryError::UnknownFunction {
                function: other.to_string(),
            }),
        }
    }
}

/// A fully resolved source entry, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Filename as configured, before normalization.
    pub filename: String,
    pub params: FetchParams,
    pub request: FetchRequest,
}

/// Why a configured source entry will be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// Not a JSON object, or a known field has the wrong JSON type.
    Malformed { entry: String, reason: String },
    /// `function` or `filename` is missing or empty.
    Invalid { entry: String },
    MissingParameter {
        function: &'static str,
        parameter: &'static str,
    },
    UnknownFunction { function: String },
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryError::Malformed { entry, reason } => {
                write!(f, "malformed entry {entry}: {reason}")
            }
            EntryError::Invalid { entry } => {
                write!(f, "invalid entry {entry}: `function` and `filename` are required")
            }
            EntryError::MissingParameter {
                function,
                parameter,
            } => write!(f, "missing '{parameter}' for {function}"),
            EntryError::UnknownFunction { function } => write!(f, "unknown function: {function}"),
        }
    }
}

impl Error for EntryError {}

#[derive(Debug, Deserialize)]
struct RawSourceEntry {
    #[serde(default)]
    function: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_country")]
    country: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// A non-empty string extra parameter.
fn extra_str(extra: &Map<String, Value>, key: &str) -> Option<String> {
    extra
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl SourceEntry {
    /// Resolve a raw `news_sources` element.
    pub fn resolve(value: &Value) -> Result<Self, EntryError> {
        let preview = || truncate_for_log(&value.to_string(), 200);

        let raw: RawSourceEntry =
            serde_json::from_value(value.clone()).map_err(|e| EntryError::Malformed {
                entry: preview(),
                reason: e.to_string(),
            })?;

        let function = raw.function.filter(|f| !f.is_empty());
        let filename = raw.filename.filter(|f| !f.is_empty());
        let (Some(function), Some(filename)) = (function, filename) else {
            return Err(EntryError::Invalid { entry: preview() });
        };

        let request = FetchRequest::resolve(&function, &raw.extra)?;
        Ok(SourceEntry {
            filename,
            params: FetchParams {
                language: raw.language,
                country: raw.country,
                max_results: raw.max_results,
            },
            request,
        })
    }
}

/// The per-app document as it appears on disk.
#[derive(Debug, Default, Deserialize)]
struct AppDocument {
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    news_sources: Vec<Value>,
}

/// One app: a name, an optional repository, and its resolved entries.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub app_name: String,
    /// `None` when absent or blank.
    pub repository: Option<String>,
    /// In configuration order; skipped entries keep their slot as an error.
    pub news_sources: Vec<Result<SourceEntry, EntryError>>,
}

impl AppConfig {
    /// Build an app from a parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let doc: AppDocument = serde_json::from_value(value)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: AppDocument) -> Self {
        AppConfig {
            app_name: doc.app_name.unwrap_or_default(),
            repository: doc
                .repository
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            news_sources: doc.news_sources.iter().map(SourceEntry::resolve).collect(),
        }
    }
}

/// What the root configuration file asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum RootConfig {
    /// Single app described inline.
    Legacy(AppConfig),
    /// Paths to per-app documents, in processing order.
    Apps(Vec<PathBuf>),
}

/// Read and parse a JSON document, failing soft.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
async fn read_document(path: &Path) -> Option<Value> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Config file not found");
            return None;
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read config file");
            return None;
        }
    };

    if text.trim().is_empty() {
        warn!(path = %path.display(), "Config file is empty");
        return None;
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) if is_empty_document(&value) => {
            warn!(path = %path.display(), "Config document is empty");
            None
        }
        Ok(value) => Some(value),
        Err(e) if looks_truncated(&e) => {
            error!(path = %path.display(), error = %e, "Config file appears truncated");
            None
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Config file is not valid JSON");
            None
        }
    }
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Interpret a root document. `base_dir` anchors relative app paths.
pub fn parse_root(value: Value, base_dir: &Path) -> Option<RootConfig> {
    let Value::Object(map) = value else {
        warn!("Root config must be a JSON object with `apps` or `news_sources`");
        return None;
    };

    if let Some(apps) = map.get("apps") {
        let Some(apps) = apps.as_array() else {
            error!("`apps` must be an array of config file paths");
            return None;
        };

        let mut paths = Vec::with_capacity(apps.len());
        for app in apps {
            match app.as_str().filter(|s| !s.is_empty()) {
                Some(p) => paths.push(base_dir.join(p)),
                None => warn!(entry = %app, "Ignoring non-path entry in `apps`"),
            }
        }

        if paths.is_empty() {
            warn!("Root config lists no apps");
            return None;
        }
        return Some(RootConfig::Apps(paths));
    }

    if map.contains_key("news_sources") || map.contains_key("app_name") {
        return match AppConfig::from_value(Value::Object(map)) {
            Ok(app) => Some(RootConfig::Legacy(app)),
            Err(e) => {
                error!(error = %e, "Legacy root config could not be read");
                None
            }
        };
    }

    warn!("Root config has neither `apps` nor `news_sources`");
    None
}

/// Load the root configuration file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_root_config(path: &Path) -> Option<RootConfig> {
    let value = read_document(path).await?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let root = parse_root(value, base_dir)?;

    match &root {
        RootConfig::Legacy(app) => {
            info!(app_name = %app.app_name, "Loaded legacy single-app config")
        }
        RootConfig::Apps(paths) => info!(apps = paths.len(), "Loaded multi-app config"),
    }
    Some(root)
}

/// Load one per-app configuration file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_app_config(path: &Path) -> Option<AppConfig> {
    let value = read_document(path).await?;
    match AppConfig::from_value(value) {
        Ok(app) => {
            info!(
                app_name = %app.app_name,
                sources = app.news_sources.len(),
                "Loaded app config"
            );
            Some(app)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "App config could not be read");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::scratch_dir;
    use serde_json::json;

    #[test]
    fn test_resolve_top_news_defaults() {
        let entry =
            SourceEntry::resolve(&json!({"function": "get_top_news", "filename": "usa_top_news.json"}))
                .unwrap();

        assert_eq!(entry.request, FetchRequest::TopNews);
        assert_eq!(entry.params, FetchParams::default());
        assert_eq!(entry.params.max_results, 99);
        assert_eq!(entry.filename, "usa_top_news.json");
    }

    #[test]
    fn test_resolve_overrides_params() {
        let entry = SourceEntry::resolve(&json!({
            "function": "get_news_by_topic",
            "filename": "fr_world_news.json",
            "language": "fr",
            "country": "FR",
            "max_results": 10,
            "topic": "WORLD"
        }))
        .unwrap();

        assert_eq!(
            entry.request,
            FetchRequest::Topic {
                topic: "WORLD".to_string()
            }
        );
        assert_eq!(entry.params.language, "fr");
        assert_eq!(entry.params.country, "FR");
        assert_eq!(entry.params.max_results, 10);
    }

    #[test]
    fn test_resolve_missing_function_or_filename() {
        let no_function = SourceEntry::resolve(&json!({"filename": "a.json"}));
        assert!(matches!(no_function, Err(EntryError::Invalid { .. })));

        let empty_filename = SourceEntry::resolve(&json!({"function": "get_top_news", "filename": ""}));
        assert!(matches!(empty_filename, Err(EntryError::Invalid { .. })));
    }

    #[test]
    fn test_resolve_missing_topic() {
        let err = SourceEntry::resolve(&json!({"function": "get_news_by_topic", "filename": "t.json"}))
            .unwrap_err();
        assert_eq!(
            err,
            EntryError::MissingParameter {
                function: "get_news_by_topic",
                parameter: "topic"
            }
        );
        assert_eq!(err.to_string(), "missing 'topic' for get_news_by_topic");
    }

    #[test]
    fn test_resolve_keyword_falls_back_to_q() {
        let entry = SourceEntry::resolve(&json!({
            "function": "get_news",
            "filename": "ai.json",
            "keyword": "",
            "q": "artificial intelligence"
        }))
        .unwrap();
        assert_eq!(
            entry.request,
            FetchRequest::Keyword {
                keyword: "artificial intelligence".to_string()
            }
        );

        let missing = SourceEntry::resolve(&json!({"function": "get_news", "filename": "ai.json"}));
        assert!(matches!(
            missing,
            Err(EntryError::MissingParameter { parameter: "keyword", .. })
        ));
    }

    #[test]
    fn test_resolve_location_and_site() {
        let location = SourceEntry::resolve(&json!({
            "function": "get_news_by_location",
            "filename": "ny.json",
            "location": "New York"
        }))
        .unwrap();
        assert_eq!(location.request.function_name(), "get_news_by_location");

        let site = SourceEntry::resolve(&json!({
            "function": "get_news_by_site",
            "filename": "cnn.json",
            "site": "cnn.com"
        }))
        .unwrap();
        assert_eq!(
            site.request,
            FetchRequest::Site {
                site: "cnn.com".to_string()
            }
        );

        let no_site = SourceEntry::resolve(&json!({"function": "get_news_by_site", "filename": "x.json", "site": 42}));
        assert!(matches!(no_site, Err(EntryError::MissingParameter { parameter: "site", .. })));
    }

    #[test]
    fn test_resolve_unknown_function() {
        let err = SourceEntry::resolve(&json!({"function": "get_weather", "filename": "w.json"}))
            .unwrap_err();
        assert_eq!(
            err,
            EntryError::UnknownFunction {
                function: "get_weather".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_malformed_entry() {
        let not_object = SourceEntry::resolve(&json!("get_top_news"));
        assert!(matches!(not_object, Err(EntryError::Malformed { .. })));

        let bad_type = SourceEntry::resolve(&json!({
            "function": "get_top_news",
            "filename": "a.json",
            "max_results": "ten"
        }));
        assert!(matches!(bad_type, Err(EntryError::Malformed { .. })));
    }

    #[test]
    fn test_app_config_keeps_entry_slots() {
        let app = AppConfig::from_value(json!({
            "app_name": "demo",
            "repository": "  ",
            "news_sources": [
                {"function": "get_top_news", "filename": "usa_top_news.json"},
                {"filename": "orphan.json"},
                {"function": "get_news_by_topic", "filename": "t.json", "topic": "SCIENCE"}
            ]
        }))
        .unwrap();

        assert_eq!(app.app_name, "demo");
        assert_eq!(app.repository, None);
        assert_eq!(app.news_sources.len(), 3);
        assert!(app.news_sources[0].is_ok());
        assert!(app.news_sources[1].is_err());
        assert!(app.news_sources[2].is_ok());
    }

    #[test]
    fn test_parse_root_multi_app() {
        let root = parse_root(
            json!({"apps": ["apps/a.json", 7, "/abs/b.json"]}),
            Path::new("conf"),
        )
        .unwrap();

        assert_eq!(
            root,
            RootConfig::Apps(vec![
                PathBuf::from("conf/apps/a.json"),
                PathBuf::from("/abs/b.json")
            ])
        );
    }

    #[test]
    fn test_parse_root_legacy() {
        let root = parse_root(
            json!({
                "app_name": "demo",
                "repository": "https://github.com/org/repo",
                "news_sources": [{"function": "get_top_news", "filename": "usa_top_news.json"}]
            }),
            Path::new(""),
        )
        .unwrap();

        match root {
            RootConfig::Legacy(app) => {
                assert_eq!(app.app_name, "demo");
                assert_eq!(app.repository.as_deref(), Some("https://github.com/org/repo"));
                assert_eq!(app.news_sources.len(), 1);
            }
            other => panic!("expected legacy config, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_root_rejects_unknown_shapes() {
        assert!(parse_root(json!({"apps": []}), Path::new("")).is_none());
        assert!(parse_root(json!({"apps": "a.json"}), Path::new("")).is_none());
        assert!(parse_root(json!({"something": 1}), Path::new("")).is_none());
        assert!(parse_root(json!([{"function": "get_top_news"}]), Path::new("")).is_none());
    }

    #[tokio::test]
    async fn test_load_root_config_missing_file() {
        let dir = scratch_dir("missing_root");
        assert!(load_root_config(&dir.join("config.json")).await.is_none());
    }

    #[tokio::test]
    async fn test_load_root_config_empty_documents() {
        let dir = scratch_dir("empty_root");
        let path = dir.join("config.json");

        std::fs::write(&path, "").unwrap();
        assert!(load_root_config(&path).await.is_none());

        std::fs::write(&path, "{}").unwrap();
        assert!(load_root_config(&path).await.is_none());

        std::fs::write(&path, "{\"apps\": [").unwrap();
        assert!(load_root_config(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_load_app_config_from_disk() {
        let dir = scratch_dir("app_config");
        let path = dir.join("news.json");
        std::fs::write(
            &path,
            r#"{"app_name": "Daily News", "news_sources": [{"function": "get_top_news", "filename": "top.json"}]}"#,
        )
        .unwrap();

        let app = load_app_config(&path).await.unwrap();
        assert_eq!(app.app_name, "Daily News");
        assert_eq!(app.repository, None);
        assert_eq!(app.news_sources.len(), 1);
    }
}
