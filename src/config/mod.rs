// src/config/mod.rs
pub mod sources;

pub use sources::{
    load_config_default, load_config_from, resolve_config_path, BriefConfig, Kind, Lang,
    SourceConfig,
};
