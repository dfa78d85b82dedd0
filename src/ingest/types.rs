// src/ingest/types.rs
use anyhow::Result;
use serde::Deserialize;

use crate::config::SourceConfig;

/// One entry as the feed produced it. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// First present of `published`, `updated`, `pubDate`; unparsed.
    pub raw_timestamp: Option<String>,
}

impl RawEntry {
    pub fn new(title: &str, link: &str, raw_timestamp: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            link: Some(link.to_string()),
            raw_timestamp: Some(raw_timestamp.to_string()),
        }
    }
}

/// Entries fetched for one source. `entries` is empty when the fetch failed.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: SourceConfig,
    pub entries: Vec<RawEntry>,
}

/// HTTP client settings handed to the fetcher at construction.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Entries considered per feed document, in document order.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    concat!("crypto-news-brief/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_entries() -> usize {
    80
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_entries: default_max_entries(),
        }
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed behind `source`.
    async fn fetch(&self, source: &SourceConfig) -> Result<Vec<RawEntry>>;
    fn name(&self) -> &'static str;
}
