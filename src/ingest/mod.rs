// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::config::SourceConfig;
use crate::ingest::types::{FeedSource, SourceBatch};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// One-time metrics registration (so series show up in the exposition).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("brief_entries_total", "Raw entries parsed from feeds.");
        describe_counter!(
            "brief_dropped_total",
            "Entries dropped for missing fields, bad timestamps or falling outside the window."
        );
        describe_counter!("brief_dedup_total", "Items removed as duplicates.");
        describe_counter!(
            "brief_fetch_errors_total",
            "Per-source fetch/parse failures and timeouts."
        );
        describe_counter!("brief_items_total", "Items placed into report sections.");
        describe_histogram!("brief_parse_ms", "Feed parse time in milliseconds.");
        describe_histogram!("brief_fetch_ms", "Per-source fetch time in milliseconds.");
    });
}

/// Clean feed text for display: decode entities, strip tags, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fetch every source concurrently. Each fetch is bounded by `timeout`; a
/// failure, timeout or panic yields an empty batch for that source. Batches
/// come back in config order.
pub async fn fetch_all(
    sources: &[SourceConfig],
    fetcher: Arc<dyn FeedSource>,
    timeout: Duration,
) -> Vec<SourceBatch> {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for src in sources.iter().cloned() {
        let fetcher = Arc::clone(&fetcher);
        set.spawn(async move {
            let t0 = std::time::Instant::now();
            let res = tokio::time::timeout(timeout, fetcher.fetch(&src)).await;
            histogram!("brief_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

            let entries = match res {
                Ok(Ok(v)) => {
                    tracing::debug!(source = %src.id, entries = v.len(), "feed fetched");
                    v
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = ?e, source = %src.id, provider = fetcher.name(), "feed fetch failed");
                    counter!("brief_fetch_errors_total").increment(1);
                    Vec::new()
                }
                Err(_) => {
                    tracing::warn!(source = %src.id, timeout_ms = timeout.as_millis() as u64, "feed fetch timed out");
                    counter!("brief_fetch_errors_total").increment(1);
                    Vec::new()
                }
            };
            SourceBatch {
                source: src,
                entries,
            }
        });
    }

    let mut by_id: HashMap<String, SourceBatch> = HashMap::with_capacity(sources.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(batch) => {
                by_id.insert(batch.source.id.clone(), batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, "feed task aborted");
                counter!("brief_fetch_errors_total").increment(1);
            }
        }
    }

    sources
        .iter()
        .map(|src| {
            by_id.remove(&src.id).unwrap_or_else(|| SourceBatch {
                source: src.clone(),
                entries: Vec::new(),
            })
        })
        .collect()
}
