//! # Deduplicator
//! Collapses items whose normalized titles match (and, when enabled, items
//! sharing a link) down to the best-ranked instance. No field merging.
//!
//! Title key: lower-case, collapse whitespace, trim, drop straight/curly
//! quotes, backticks and `[](){}`, then strip trailing `!?.,`.

use metrics::counter;
use serde::Deserialize;
use std::collections::HashSet;

use crate::item::{sort_ranked, Item};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DedupConfig {
    /// Also treat byte-identical links as duplicates.
    #[serde(default = "default_by_link")]
    pub by_link: bool,
}

fn default_by_link() -> bool {
    true
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            by_link: default_by_link(),
        }
    }
}

fn is_stripped(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '`' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '[' | ']' | '('
            | ')' | '{' | '}'
    )
}

/// Normalized comparison key for a title.
pub fn title_key(title: &str) -> String {
    let collapsed = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let stripped: String = collapsed.chars().filter(|c| !is_stripped(*c)).collect();
    stripped
        .trim_end_matches(|c: char| matches!(c, '!' | '?' | '.' | ',') || c.is_whitespace())
        .to_string()
}

/// Rank `items`, then keep the first item per title key (and per link).
/// Output stays in ranked order.
pub fn dedup(mut items: Vec<Item>, cfg: &DedupConfig) -> Vec<Item> {
    sort_ranked(&mut items);

    let mut seen_keys: HashSet<String> = HashSet::with_capacity(items.len());
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    let mut removed = 0usize;

    for it in items {
        let key = title_key(&it.title);
        let link_dup = cfg.by_link && seen_links.contains(&it.link);
        if link_dup || seen_keys.contains(&key) {
            tracing::debug!(source = %it.source_id, key = %key, "duplicate dropped");
            removed += 1;
            continue;
        }
        seen_keys.insert(key);
        if cfg.by_link {
            seen_links.insert(it.link.clone());
        }
        out.push(it);
    }

    counter!("brief_dedup_total").increment(removed as u64);
    out
}
