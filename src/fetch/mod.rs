//! Match history retrieval.
//!
//! Providers return one page of a player's games, newest first. The HTTP
//! provider talks to the public match API; the file provider reads a saved
//! response from disk.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::models::{MatchRecord, PlayerId};

/// Errors that can occur while fetching match history.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("Malformed match history: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source of a player's match history.
#[async_trait]
pub trait MatchHistoryProvider: Send + Sync {
    /// Provider identifier for logging.
    fn name(&self) -> &'static str;

    /// Fetch the player's most recent games, newest first.
    async fn fetch_matches(&self, player_id: PlayerId) -> Result<Vec<MatchRecord>, FetchError>;
}

#[async_trait]
impl<P: MatchHistoryProvider + ?Sized> MatchHistoryProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_matches(&self, player_id: PlayerId) -> Result<Vec<MatchRecord>, FetchError> {
        (**self).fetch_matches(player_id).await
    }
}

/// Configuration for the HTTP match history client.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// API root, e.g. `https://api.2018.halite.io/v1/api`
    pub base_url: String,

    /// Maximum number of games requested per player
    pub match_limit: u32,

    /// Maximum response size accepted (default 16MB)
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_API_URL.to_string(),
            match_limit: crate::config::DEFAULT_MATCH_LIMIT,
            max_content_size: 16 * 1024 * 1024,
            timeout: Duration::from_secs(30),
            user_agent: concat!("halite-stats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Match history client for the HTTP+JSON match API.
pub struct HttpMatchHistory {
    client: Client,
    config: FetcherConfig,
}

impl HttpMatchHistory {
    /// Create a new client with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("halite-stats")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    /// Build the match listing URL for a player.
    ///
    /// Results are ordered by play time, newest first.
    pub fn matches_url(&self, player_id: PlayerId) -> Result<Url, FetchError> {
        let invalid = || FetchError::InvalidUrl(self.config.base_url.clone());

        let mut url = Url::parse(&self.config.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["user", &player_id.to_string(), "match"]);
        url.query_pairs_mut()
            .append_pair("order_by", "desc,time_played")
            .append_pair("limit", &self.config.match_limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl MatchHistoryProvider for HttpMatchHistory {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_matches(&self, player_id: PlayerId) -> Result<Vec<MatchRecord>, FetchError> {
        let url = self.matches_url(player_id)?;
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content = response.bytes().await?;

        if content.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.config.max_content_size,
            });
        }

        let records = parse_match_history(&content)?;
        debug!(player_id = %player_id, games = records.len(), "Decoded match history");
        Ok(records)
    }
}

/// Match history read from a saved API response on disk.
#[derive(Debug, Clone)]
pub struct FileMatchHistory {
    path: PathBuf,
}

impl FileMatchHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MatchHistoryProvider for FileMatchHistory {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_matches(&self, player_id: PlayerId) -> Result<Vec<MatchRecord>, FetchError> {
        info!("Reading match history for {} from {:?}", player_id, self.path);
        let content = fs::read(&self.path).await?;
        parse_match_history(&content)
    }
}

/// Decode a JSON array of games as returned by the match API.
pub fn parse_match_history(content: &[u8]) -> Result<Vec<MatchRecord>, FetchError> {
    Ok(serde_json::from_slice(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAGE: &str = r#"[
        {
            "game_id": 2,
            "challenge_id": null,
            "map_width": 64,
            "players": {
                "5": {"rank": 3, "username": "bot"},
                "6": {"rank": 1},
                "7": {"rank": 2},
                "8": {"rank": 4}
            }
        },
        {
            "game_id": 1,
            "challenge_id": null,
            "map_width": 32,
            "players": {"5": {"rank": 1, "username": "bot"}, "6": {"rank": 2}}
        }
    ]"#;

    fn test_config(base_url: &str) -> FetcherConfig {
        FetcherConfig {
            base_url: base_url.to_string(),
            match_limit: 250,
            max_content_size: 1024 * 1024,
            timeout: Duration::from_secs(10),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn test_matches_url() {
        let client =
            HttpMatchHistory::new(test_config("https://api.2018.halite.io/v1/api")).unwrap();
        let url = client.matches_url(PlayerId::new(2807)).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.2018.halite.io/v1/api/user/2807/match?order_by=desc%2Ctime_played&limit=250"
        );
    }

    #[test]
    fn test_matches_url_trailing_slash() {
        let client = HttpMatchHistory::new(test_config("http://localhost:5000/v1/api/")).unwrap();
        let url = client.matches_url(PlayerId::new(1)).unwrap();

        assert_eq!(url.path(), "/v1/api/user/1/match");
    }

    #[test]
    fn test_matches_url_respects_limit() {
        let mut config = test_config("https://example.com/api");
        config.match_limit = 20;
        let client = HttpMatchHistory::new(config).unwrap();
        let url = client.matches_url(PlayerId::new(1)).unwrap();

        assert!(url.query_pairs().any(|(k, v)| k == "limit" && v == "20"));
    }

    #[test]
    fn test_matches_url_rejects_non_hierarchical_base() {
        let client = HttpMatchHistory::new(test_config("mailto:someone@example.com")).unwrap();
        assert!(matches!(
            client.matches_url(PlayerId::new(1)),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_matches_url_rejects_unparseable_base() {
        let client = HttpMatchHistory::new(test_config("not a url")).unwrap();
        assert!(matches!(
            client.matches_url(PlayerId::new(1)),
            Err(FetchError::InvalidUrl(u)) if u == "not a url"
        ));
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();

        assert_eq!(config.base_url, "https://api.2018.halite.io/v1/api");
        assert_eq!(config.match_limit, 250);
        assert!(config.user_agent.starts_with("halite-stats/"));
    }

    #[test]
    fn test_parse_match_history() {
        let records = parse_match_history(PAGE.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].game_id, Some(2));
        assert_eq!(records[0].participant_count(), 4);
        assert_eq!(records[1].map_width, 32);
    }

    #[test]
    fn test_parse_match_history_malformed() {
        assert!(matches!(
            parse_match_history(b"{\"error\": \"not found\"}"),
            Err(FetchError::Json(_))
        ));
        assert!(matches!(
            parse_match_history(b"<html>"),
            Err(FetchError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_file_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();

        let provider = FileMatchHistory::new(file.path());
        let records = provider.fetch_matches(PlayerId::new(5)).await.unwrap();

        assert_eq!(provider.name(), "file");
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_file_provider_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileMatchHistory::new(dir.path().join("missing.json"));

        let result = provider.fetch_matches(PlayerId::new(5)).await;
        assert!(matches!(result, Err(FetchError::Io(_))));
    }
}
