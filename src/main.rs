//! Crypto news brief: binary entrypoint.
//! Loads the source registry, fetches every feed, and writes the static brief.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_brief::config::resolve_config_path;
use crypto_news_brief::ingest::providers::http::HttpFeedSource;
use crypto_news_brief::render::{write_site, OutputFormat};
use crypto_news_brief::telemetry::Metrics;
use crypto_news_brief::window::{parse_offset, Window};
use crypto_news_brief::{config, run};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Json,
    Both,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Both => OutputFormat::Both,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "crypto-news-brief", about = "Windowed crypto news brief generator")]
struct Args {
    /// Look-back window in hours
    #[arg(long, default_value_t = 4)]
    window_hours: u32,

    /// Reference UTC offset for the window and timestamps
    #[arg(long, default_value = "+08:00")]
    tz_offset: String,

    /// Override "now" (RFC 3339); defaults to the wall clock
    #[arg(long, value_name = "RFC3339")]
    now: Option<String>,

    /// Path to the sources config (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "site")]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatArg::Html)]
    format: FormatArg,

    /// Override log level (info, debug, warn, error); RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write a Prometheus text exposition of the run's metrics here
    #[arg(long, value_name = "FILE")]
    metrics_file: Option<PathBuf>,
}

/// Compact logs by default; JSON lines when BRIEF_LOG_JSON=1.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("BRIEF_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

/// Record who/what triggered this run (CI scheduler, manual dispatch, local).
fn log_run_provenance() {
    let workflow = std::env::var("GITHUB_WORKFLOW").unwrap_or_else(|_| "Local Run".into());
    let actor = std::env::var("GITHUB_ACTOR").unwrap_or_else(|_| "Unknown".into());
    let event = std::env::var("GITHUB_EVENT_NAME").unwrap_or_else(|_| "manual/local".into());
    let trigger = match event.as_str() {
        "schedule" => "scheduled",
        "workflow_dispatch" => "manual dispatch",
        _ => "other",
    };
    info!(%workflow, %actor, %event, trigger, "run started");
}

fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("--now `{s}` is not RFC 3339"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(&args.log_level);
    log_run_provenance();

    // Configuration errors abort before any fetching.
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = match config::load_config_from(&cfg_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %format!("{e:#}"), path = %cfg_path.display(), "failed to load configuration");
            return Err(e);
        }
    };
    info!(
        path = %cfg_path.display(),
        sources = cfg.sources.len(),
        keyword_table = cfg.scoring.table_version(),
        "configuration loaded"
    );

    let tz = parse_offset(&args.tz_offset)?;
    let now = resolve_now(args.now.as_deref())?;
    let window = Window::ending_at(now, args.window_hours, tz)?;
    info!(start = %window.start, end = %window.end, "window");

    let metrics = match &args.metrics_file {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    let fetcher = Arc::new(HttpFeedSource::new(&cfg.fetch)?);
    let brief = run(&cfg, fetcher, window).await;

    let written = write_site(&args.out, &brief, args.format.into())?;
    for p in &written {
        info!(path = %p.display(), "wrote");
    }

    if let (Some(m), Some(path)) = (metrics, args.metrics_file.as_deref()) {
        m.write_to(path)?;
        info!(path = %path.display(), "metrics written");
    }

    Ok(())
}
