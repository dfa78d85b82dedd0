// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod brief;
pub mod config;
pub mod dedup;
pub mod ingest;
pub mod item;
pub mod render;
pub mod sections;
pub mod telemetry;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{classify, score, Category};
pub use crate::brief::{assemble, run, Brief, LanguageBrief};
pub use crate::config::{BriefConfig, Kind, Lang, SourceConfig};
pub use crate::dedup::{dedup, title_key, DedupConfig};
pub use crate::ingest::types::{FeedSource, RawEntry, SourceBatch};
pub use crate::item::Item;
pub use crate::sections::{select_sections, SectionLimits, Sections};
pub use crate::window::Window;
