// src/config/sources.rs
//! Source registry: the feed list plus the optional tuning tables that live in
//! the same file.
//!
//! Lookup order for the config file:
//! 1) explicit path (CLI `--config`)
//! 2) $BRIEF_CONFIG_PATH
//! 3) config/sources.toml
//! 4) config/sources.json
//!
//! Everything here is validated before any fetching begins; a bad file aborts
//! the run with a message naming the offending source and field.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::scoring::ScoringConfig;
use crate::dedup::DedupConfig;
use crate::ingest::types::FetchConfig;
use crate::sections::SectionLimits;

pub const ENV_CONFIG_PATH: &str = "BRIEF_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/sources.toml";
pub const DEFAULT_JSON_PATH: &str = "config/sources.json";

/// Language partition of a source. Unrecognized tags land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Zh,
    #[serde(other)]
    Other,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Zh => "zh",
            Lang::Other => "other",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cadence of a source; picks the scorer baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    News,
    Newsflash,
    #[serde(other)]
    Other,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::News => "news",
            Kind::Newsflash => "newsflash",
            Kind::Other => "other",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    /// Opaque fetch location (http(s):// or file://).
    pub url: String,
    pub lang: Lang,
    pub kind: Kind,
    /// Multiplier applied to the keyword score. Must be positive.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Whole config file: sources plus optional tuning tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BriefConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub sections: SectionLimits,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl BriefConfig {
    /// Sources belonging to one language partition, in config order.
    pub fn sources_for(&self, lang: Lang) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(move |s| s.lang == lang)
    }
}

/// Load and validate a config from an explicit path. TOML or JSON.
pub fn load_config_from(path: &Path) -> Result<BriefConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing sources config {}", path.display()))?;
    validate(cfg).with_context(|| format!("invalid sources config {}", path.display()))
}

/// Find the config file using the explicit path, env var and fallbacks.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Ok(p.to_path_buf());
        }
        bail!("config file not found: {}", p.display());
    }
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(pb);
        }
    }
    bail!("no sources config found (tried ${ENV_CONFIG_PATH}, {DEFAULT_TOML_PATH}, {DEFAULT_JSON_PATH})")
}

/// Resolve and load in one step.
pub fn load_config_default() -> Result<BriefConfig> {
    let path = resolve_config_path(None)?;
    load_config_from(&path)
}

/// Parse a config document. The extension hint wins; otherwise sniff the content.
pub fn parse_config(s: &str, hint_ext: &str) -> Result<BriefConfig> {
    let as_json = match hint_ext {
        "json" => true,
        "toml" => false,
        _ => s.trim_start().starts_with('{'),
    };
    if as_json {
        Ok(serde_json::from_str(s)?)
    } else {
        Ok(toml::from_str(s)?)
    }
}

/// Trim string fields and reject anything the pipeline cannot run with.
pub fn validate(mut cfg: BriefConfig) -> Result<BriefConfig> {
    if cfg.sources.is_empty() {
        bail!("no sources defined");
    }
    if cfg.fetch.timeout_secs == 0 {
        bail!("fetch.timeout_secs must be greater than zero");
    }

    let mut seen = HashSet::new();
    for (idx, src) in cfg.sources.iter_mut().enumerate() {
        src.id = src.id.trim().to_string();
        src.name = src.name.trim().to_string();
        src.url = src.url.trim().to_string();

        if src.id.is_empty() {
            bail!("source #{idx}: `id` must not be empty");
        }
        if src.name.is_empty() {
            bail!("source `{}`: `name` must not be empty", src.id);
        }
        if src.url.is_empty() {
            bail!("source `{}`: `url` must not be empty", src.id);
        }
        if !src.weight.is_finite() || src.weight <= 0.0 {
            bail!(
                "source `{}`: `weight` must be a positive number (got {})",
                src.id,
                src.weight
            );
        }
        if !seen.insert(src.id.clone()) {
            bail!("duplicate source id `{}`", src.id);
        }
        if src.lang == Lang::Other {
            tracing::warn!(source = %src.id, "unrecognized lang tag, grouped under `other`");
        }
        if src.kind == Kind::Other {
            tracing::warn!(source = %src.id, "unrecognized kind tag, default baseline applies");
        }
    }

    Ok(cfg)
}
