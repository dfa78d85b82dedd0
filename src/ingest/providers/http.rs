// src/ingest/providers/http.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::ingest::providers::feed::parse_feed;
use crate::ingest::types::{FeedSource, FetchConfig, RawEntry};

/// Fetches feeds over HTTP(S); `file://` locations are read from disk.
pub struct HttpFeedSource {
    client: reqwest::Client,
    max_entries: usize,
}

impl HttpFeedSource {
    pub fn new(cfg: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            max_entries: cfg.max_entries,
        })
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading feed file {path}"));
        }

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("feed fetch failed with status: {status}"));
        }
        resp.text().await.context("reading response body")
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, source: &SourceConfig) -> Result<Vec<RawEntry>> {
        let body = self.fetch_body(&source.url).await?;
        parse_feed(&body, self.max_entries).with_context(|| format!("feed of `{}`", source.id))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
