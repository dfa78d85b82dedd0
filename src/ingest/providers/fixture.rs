// src/ingest/providers/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::ingest::providers::feed::parse_feed;
use crate::ingest::types::{FeedSource, RawEntry};

#[derive(Debug, Clone)]
enum Canned {
    Document(String),
    Entries(Vec<RawEntry>),
    Fail(String),
    Stall(Duration),
}

/// In-memory feed source keyed by source id. Ids without a registration
/// yield an empty feed.
#[derive(Debug, Clone)]
pub struct FixtureFeedSource {
    by_id: HashMap<String, Canned>,
    max_entries: usize,
}

impl Default for FixtureFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureFeedSource {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            max_entries: 80,
        }
    }

    /// Serve an XML document, parsed the same way as a fetched one.
    pub fn with_document(mut self, id: &str, xml: &str) -> Self {
        self.by_id
            .insert(id.to_string(), Canned::Document(xml.to_string()));
        self
    }

    /// Serve already-parsed entries.
    pub fn with_entries(mut self, id: &str, entries: Vec<RawEntry>) -> Self {
        self.by_id.insert(id.to_string(), Canned::Entries(entries));
        self
    }

    /// Fail every fetch of `id` with `message`.
    pub fn with_failure(mut self, id: &str, message: &str) -> Self {
        self.by_id
            .insert(id.to_string(), Canned::Fail(message.to_string()));
        self
    }

    /// Sleep for `d` before answering with an empty feed.
    pub fn with_stall(mut self, id: &str, d: Duration) -> Self {
        self.by_id.insert(id.to_string(), Canned::Stall(d));
        self
    }
}

#[async_trait]
impl FeedSource for FixtureFeedSource {
    async fn fetch(&self, source: &SourceConfig) -> Result<Vec<RawEntry>> {
        match self.by_id.get(&source.id) {
            Some(Canned::Document(xml)) => parse_feed(xml, self.max_entries),
            Some(Canned::Entries(v)) => Ok(v.iter().take(self.max_entries).cloned().collect()),
            Some(Canned::Fail(msg)) => Err(anyhow!("{msg}")),
            Some(Canned::Stall(d)) => {
                tokio::time::sleep(*d).await;
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
