//! # Section Selector
//! Splits a ranked, deduplicated item list into disjoint Breaking, Headlines
//! and Quick buckets.
//!
//! Breaking takes the first `breaking_cap` items scoring at least
//! `breaking_threshold`; Headlines and Quick are then cut from what remains,
//! in ranked order. Anything past Quick is not displayed.

use serde::{Deserialize, Serialize};

use crate::item::{sort_ranked, Item};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SectionLimits {
    #[serde(default = "default_breaking_threshold")]
    pub breaking_threshold: f64,
    #[serde(default = "default_breaking_cap")]
    pub breaking_cap: usize,
    #[serde(default = "default_headlines_cap")]
    pub headlines_cap: usize,
    #[serde(default = "default_quick_cap")]
    pub quick_cap: usize,
}

fn default_breaking_threshold() -> f64 {
    8.8
}
fn default_breaking_cap() -> usize {
    2
}
fn default_headlines_cap() -> usize {
    5
}
fn default_quick_cap() -> usize {
    12
}

impl Default for SectionLimits {
    fn default() -> Self {
        Self {
            breaking_threshold: default_breaking_threshold(),
            breaking_cap: default_breaking_cap(),
            headlines_cap: default_headlines_cap(),
            quick_cap: default_quick_cap(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sections {
    pub breaking: Vec<Item>,
    pub headlines: Vec<Item>,
    pub quick: Vec<Item>,
}

impl Sections {
    pub fn len(&self) -> usize {
        self.breaking.len() + self.headlines.len() + self.quick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn select_sections(mut ranked: Vec<Item>, limits: &SectionLimits) -> Sections {
    // Already ranked in the normal flow; re-sorting keeps direct callers honest.
    sort_ranked(&mut ranked);

    let mut breaking = Vec::with_capacity(limits.breaking_cap);
    let mut rest = Vec::with_capacity(ranked.len());
    for it in ranked {
        if breaking.len() < limits.breaking_cap && it.score >= limits.breaking_threshold {
            breaking.push(it);
        } else {
            rest.push(it);
        }
    }

    let mut rest = rest.into_iter();
    let headlines: Vec<Item> = rest.by_ref().take(limits.headlines_cap).collect();
    let quick: Vec<Item> = rest.take(limits.quick_cap).collect();

    Sections {
        breaking,
        headlines,
        quick,
    }
}
