// src/brief.rs
//! Pipeline assembly: window filter → classify/score → dedup → sections,
//! once per language partition.

use chrono::{DateTime, FixedOffset};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BriefConfig, Lang};
use crate::dedup::dedup;
use crate::ingest::fetch_all;
use crate::ingest::types::{FeedSource, SourceBatch};
use crate::item::Item;
use crate::sections::{select_sections, Sections};
use crate::window::{filter_entries, Window};

/// Sections for one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageBrief {
    pub lang: Lang,
    #[serde(flatten)]
    pub sections: Sections,
}

/// Everything the renderer needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brief {
    pub generated_at: DateTime<FixedOffset>,
    pub window_start: DateTime<FixedOffset>,
    pub window_end: DateTime<FixedOffset>,
    /// Keyword table the scores were computed with.
    pub keyword_table: &'static str,
    pub languages: Vec<LanguageBrief>,
}

impl Brief {
    pub fn language(&self, lang: Lang) -> Option<&LanguageBrief> {
        self.languages.iter().find(|l| l.lang == lang)
    }
}

/// `en` and `zh` always; `other` only when some source uses it.
fn partitions(cfg: &BriefConfig) -> Vec<Lang> {
    let mut langs = vec![Lang::En, Lang::Zh];
    if cfg.sources_for(Lang::Other).next().is_some() {
        langs.push(Lang::Other);
    }
    langs
}

/// Turn fetched batches into classified, scored items inside the window.
pub fn build_items(cfg: &BriefConfig, batches: &[SourceBatch], window: &Window) -> Vec<Item> {
    let mut items = Vec::new();
    for batch in batches {
        let candidates = filter_entries(&batch.source.id, &batch.entries, window);
        tracing::debug!(
            source = %batch.source.id,
            entries = batch.entries.len(),
            kept = candidates.len(),
            "window filter"
        );
        items.extend(
            candidates
                .into_iter()
                .map(|c| Item::from_candidate(c, &batch.source, &cfg.scoring)),
        );
    }
    items
}

/// Pure part of the run: no I/O, no clock.
pub fn assemble(cfg: &BriefConfig, batches: &[SourceBatch], window: &Window) -> Brief {
    let items = build_items(cfg, batches, window);

    let languages = partitions(cfg)
        .into_iter()
        .map(|lang| {
            let part: Vec<Item> = items.iter().filter(|i| i.lang == lang).cloned().collect();
            let candidates = part.len();
            let unique = dedup(part, &cfg.dedup);
            let unique_len = unique.len();
            let sections = select_sections(unique, &cfg.sections);

            tracing::info!(
                lang = %lang,
                candidates,
                unique = unique_len,
                breaking = sections.breaking.len(),
                headlines = sections.headlines.len(),
                quick = sections.quick.len(),
                "sections selected"
            );
            counter!("brief_items_total", "lang" => lang.as_str()).increment(sections.len() as u64);

            LanguageBrief { lang, sections }
        })
        .collect();

    Brief {
        generated_at: window.end,
        window_start: window.start,
        window_end: window.end,
        keyword_table: cfg.scoring.table_version(),
        languages,
    }
}

/// Fetch every configured source, then assemble the brief.
pub async fn run(cfg: &BriefConfig, fetcher: Arc<dyn FeedSource>, window: Window) -> Brief {
    let timeout = Duration::from_secs(cfg.fetch.timeout_secs);
    let batches = fetch_all(&cfg.sources, fetcher, timeout).await;
    assemble(cfg, &batches, &window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Kind, SourceConfig};
    use crate::ingest::types::RawEntry;
    use chrono::{TimeZone, Utc};

    fn source(id: &str, lang: Lang) -> SourceConfig {
        SourceConfig {
            id: id.into(),
            name: id.to_uppercase(),
            url: format!("https://{id}.test/rss"),
            lang,
            kind: Kind::News,
            weight: 1.0,
        }
    }

    fn window() -> Window {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 4, 0, 0).unwrap();
        Window::ending_at(now, 4, FixedOffset::east_opt(8 * 3600).unwrap()).unwrap()
    }

    #[test]
    fn languages_are_partitioned_and_always_present() {
        let cfg = BriefConfig {
            sources: vec![source("en1", Lang::En)],
            ..BriefConfig::default()
        };
        let batches = vec![SourceBatch {
            source: cfg.sources[0].clone(),
            entries: vec![RawEntry::new(
                "Bridge exploit drains $10M",
                "https://en1.test/1",
                "2025-06-10T03:00:00Z",
            )],
        }];
        let brief = assemble(&cfg, &batches, &window());
        assert_eq!(brief.languages.len(), 2);
        let en = brief.language(Lang::En).unwrap();
        assert_eq!(en.sections.breaking.len(), 1);
        assert!(brief.language(Lang::Zh).unwrap().sections.is_empty());
        assert!(brief.language(Lang::Other).is_none());
    }

    #[test]
    fn duplicates_across_sources_collapse_per_language() {
        let cfg = BriefConfig {
            sources: vec![source("a", Lang::En), source("b", Lang::En), source("c", Lang::Zh)],
            ..BriefConfig::default()
        };
        let entry = |link: &str| RawEntry::new("Exchange Hacked for $50M", link, "2025-06-10T03:00:00Z");
        let batches: Vec<SourceBatch> = cfg
            .sources
            .iter()
            .map(|s| SourceBatch {
                source: s.clone(),
                entries: vec![entry(&format!("https://{}.test/x", s.id))],
            })
            .collect();
        let brief = assemble(&cfg, &batches, &window());
        assert_eq!(brief.language(Lang::En).unwrap().sections.len(), 1);
        assert_eq!(brief.language(Lang::Zh).unwrap().sections.len(), 1);
    }

    #[test]
    fn other_partition_appears_when_configured() {
        let cfg = BriefConfig {
            sources: vec![source("en1", Lang::En), source("misc", Lang::Other)],
            ..BriefConfig::default()
        };
        let batches = vec![SourceBatch {
            source: cfg.sources[1].clone(),
            entries: vec![
                RawEntry::new("SEC opens probe", "https://misc.test/1", "2025-06-10T03:00:00Z"),
                RawEntry::new("Too old", "https://misc.test/2", "2025-06-09T03:00:00Z"),
            ],
        }];
        let brief = assemble(&cfg, &batches, &window());
        let langs: Vec<Lang> = brief.languages.iter().map(|l| l.lang).collect();
        assert_eq!(langs, [Lang::En, Lang::Zh, Lang::Other]);

        let other = brief.language(Lang::Other).unwrap();
        assert_eq!(other.sections.len(), 1);
        assert_eq!(other.sections.headlines[0].lang, Lang::Other);
        assert!(brief.language(Lang::En).unwrap().sections.is_empty());
    }
}
