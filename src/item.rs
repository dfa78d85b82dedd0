// src/item.rs
//! The pipeline's working unit and its ranking order.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::cmp::Ordering;

use crate::analyze::{classify, Category, ScoringConfig};
use crate::config::{Kind, Lang, SourceConfig};
use crate::window::Candidate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Display name of the originating source.
    pub source: String,
    pub source_id: String,
    pub title: String,
    pub link: String,
    /// Publication time in the run's reference offset.
    pub published: DateTime<FixedOffset>,
    pub class: Category,
    /// In [0, 10], one decimal.
    pub score: f64,
    pub kind: Kind,
    pub lang: Lang,
}

impl Item {
    /// Classify and score a candidate on behalf of `source`.
    pub fn from_candidate(c: Candidate, source: &SourceConfig, scoring: &ScoringConfig) -> Self {
        let class = classify(&c.title);
        let score = scoring.score(&c.title, source.kind, source.weight);
        Self {
            source: source.name.clone(),
            source_id: source.id.clone(),
            title: c.title,
            link: c.link,
            published: c.published,
            class,
            score,
            kind: source.kind,
            lang: source.lang,
        }
    }
}

/// Higher score first, then more recent first. The trailing keys only make
/// the order total so that arrival order never leaks into the output.
pub fn rank_cmp(a: &Item, b: &Item) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.published.cmp(&a.published))
        .then_with(|| a.source_id.cmp(&b.source_id))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.link.cmp(&b.link))
}

pub fn sort_ranked(items: &mut [Item]) {
    items.sort_by(rank_cmp);
}


#[cfg(test)]
mod tests {
    use super::test_support::item;
    use super::*;

    #[test]
    fn ranks_by_score_then_recency() {
        let mut v = vec![
            item("old high", "l1", 9.0, 0),
            item("low", "l2", 5.0, 90),
            item("new high", "l3", 9.0, 30),
        ];
        sort_ranked(&mut v);
        let titles: Vec<_> = v.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["new high", "old high", "low"]);
    }

    #[test]
    fn from_candidate_uses_source_kind_and_weight() {
        let src = SourceConfig {
            id: "wu".into(),
            name: "Wu Blockchain".into(),
            url: "file:///dev/null".into(),
            lang: Lang::Zh,
            kind: Kind::Newsflash,
            weight: 1.5,
        };
        let base = item("x", "y", 0.0, 0);
        let c = Candidate {
            title: "ETF approved".into(),
            link: "https://x.test/etf".into(),
            published: base.published,
        };
        let it = Item::from_candidate(c, &src, &ScoringConfig::default());
        assert_eq!(it.class, Category::BizCapital);
        assert!((it.score - 9.3).abs() < 1e-9);
        assert_eq!(it.source, "Wu Blockchain");
        assert_eq!(it.lang, Lang::Zh);
    }
}
