//! Importance scoring.
//!
//! score = (baseline(kind) + Σ keyword weights present in the title) × source weight,
//! clamped to [0, 10] and rounded to one decimal.
//!
//! The keyword table is the canonical `v1` table; the `[scoring]` config table
//! may replace it wholesale, never merge with it.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::config::Kind;

pub const KEYWORD_TABLE_VERSION: &str = "v1";
/// Reported instead of the version when `[scoring] keywords` replaces the table.
pub const CUSTOM_KEYWORD_TABLE: &str = "custom";
pub const MAX_SCORE: f64 = 10.0;

/// `(substring, addition)`; matched against the lower-cased title.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Keyword(pub String, pub f64);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_news_baseline")]
    pub news_baseline: f64,
    #[serde(default = "default_newsflash_baseline")]
    pub newsflash_baseline: f64,
    /// Used for kinds the config does not recognize.
    #[serde(default = "default_newsflash_baseline")]
    pub default_baseline: f64,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<Keyword>,
}

fn default_news_baseline() -> f64 {
    4.6
}

fn default_newsflash_baseline() -> f64 {
    4.2
}

fn default_keywords() -> Vec<Keyword> {
    [
        ("exploit", 2.6),
        ("hack", 2.6),
        ("drain", 2.4),
        ("sec", 2.1),
        ("lawsuit", 2.0),
        ("court", 1.8),
        ("etf", 2.0),
        ("liquidat", 2.0),
        ("stablecoin", 1.6),
        ("btc", 0.6),
        ("eth", 0.4),
    ]
    .into_iter()
    .map(|(k, w)| Keyword(k.to_string(), w))
    .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            news_baseline: default_news_baseline(),
            newsflash_baseline: default_newsflash_baseline(),
            default_baseline: default_newsflash_baseline(),
            keywords: default_keywords(),
        }
    }
}

static DEFAULT_SCORING: Lazy<ScoringConfig> = Lazy::new(ScoringConfig::default);

impl ScoringConfig {
    /// Which keyword table is in effect.
    pub fn table_version(&self) -> &'static str {
        if self.keywords == default_keywords() {
            KEYWORD_TABLE_VERSION
        } else {
            CUSTOM_KEYWORD_TABLE
        }
    }

    pub fn baseline(&self, kind: Kind) -> f64 {
        match kind {
            Kind::News => self.news_baseline,
            Kind::Newsflash => self.newsflash_baseline,
            Kind::Other => self.default_baseline,
        }
    }

    /// Total: a non-finite or non-positive weight counts as 1.0.
    pub fn score(&self, title: &str, kind: Kind, weight: f64) -> f64 {
        let t = title.to_lowercase();
        let base = self.baseline(kind)
            + self
                .keywords
                .iter()
                .filter(|Keyword(k, _)| !k.is_empty() && t.contains(k.as_str()))
                .map(|Keyword(_, w)| *w)
                .sum::<f64>();

        let weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            1.0
        };
        let raw = base * weight;
        if !raw.is_finite() {
            return 0.0;
        }
        round1(raw.clamp(0.0, MAX_SCORE))
    }
}

/// Score with the canonical table and baselines.
pub fn score(title: &str, kind: Kind, weight: f64) -> f64 {
    DEFAULT_SCORING.score(title, kind, weight)
}

/// Round half away from zero to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
