// src/analyze/mod.rs
//! Per-item analysis: topic class and importance score.

pub mod classify;
pub mod scoring;

pub use crate::analyze::classify::{classify, Category};
pub use crate::analyze::scoring::{score, ScoringConfig};
