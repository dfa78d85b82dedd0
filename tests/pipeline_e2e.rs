// tests/pipeline_e2e.rs
use chrono::{FixedOffset, TimeZone, Utc};
use crypto_news_brief::ingest::providers::fixture::FixtureFeedSource;
use crypto_news_brief::{run, BriefConfig, Category, Kind, Lang, SourceConfig, Window};
use std::sync::Arc;
use std::time::{Duration, Instant};

const COINDESK_XML: &str = include_str!("fixtures/coindesk_rss.xml");
const WU_XML: &str = include_str!("fixtures/wu_atom.xml");

fn source(id: &str, lang: Lang, kind: Kind) -> SourceConfig {
    SourceConfig {
        id: id.into(),
        name: id.to_uppercase(),
        url: format!("https://{id}.example.test/feed"),
        lang,
        kind,
        weight: 1.0,
    }
}

fn window() -> Window {
    // 08:00–12:00 SGT == 00:00–04:00 UTC
    let now = Utc.with_ymd_and_hms(2025, 6, 10, 4, 0, 0).unwrap();
    Window::ending_at(now, 4, FixedOffset::east_opt(8 * 3600).unwrap()).unwrap()
}

fn config() -> BriefConfig {
    let mut cfg = BriefConfig {
        sources: vec![
            source("coindesk", Lang::En, Kind::News),
            source("broken", Lang::En, Kind::News),
            source("slow", Lang::En, Kind::News),
            source("wu", Lang::Zh, Kind::Newsflash),
        ],
        ..BriefConfig::default()
    };
    cfg.fetch.timeout_secs = 1;
    cfg
}

fn fetcher() -> FixtureFeedSource {
    FixtureFeedSource::new()
        .with_document("coindesk", COINDESK_XML)
        .with_document("wu", WU_XML)
        .with_failure("broken", "connection reset by peer")
        .with_stall("slow", Duration::from_secs(30))
}

#[tokio::test]
async fn failing_and_hung_sources_do_not_sink_the_run() {
    let t0 = Instant::now();
    let brief = run(&config(), Arc::new(fetcher()), window()).await;
    assert!(t0.elapsed() < Duration::from_secs(10), "hung fetch was not bounded");

    let en = &brief.language(Lang::En).expect("en partition").sections;
    let breaking: Vec<_> = en.breaking.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(breaking, ["Bridge Exploit Drains $120M From DeFi Protocol"]);
    assert!((en.breaking[0].score - 9.6).abs() < 1e-9);
    assert_eq!(en.breaking[0].class, Category::Security);

    // Equal 7.2 scores: the more recent one leads; the "$50m!!" variant is gone.
    let headlines: Vec<_> = en.headlines.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        headlines,
        [
            "Liquidations hit $1B as BTC slides",
            "Exchange Hacked for $50M",
            "SEC Sues Major Exchange Over Unregistered Securities",
            "Bitcoin ETF sees record inflows",
        ]
    );
    assert_eq!(en.headlines[2].class, Category::Regulation);
    assert_eq!(en.headlines[3].class, Category::BizCapital);
    assert!(en.quick.is_empty());

    let zh = &brief.language(Lang::Zh).expect("zh partition").sections;
    assert!(zh.breaking.is_empty());
    assert_eq!(zh.headlines.len(), 2);
    assert_eq!(zh.headlines[0].link, "https://wu.example.test/1");
    assert!((zh.headlines[0].score - 6.8).abs() < 1e-9);
    assert_eq!(zh.headlines[0].source, "WU");
    assert_eq!(zh.headlines[0].lang, Lang::Zh);
}

#[tokio::test]
async fn every_item_is_inside_the_window_and_in_reference_zone() {
    let w = window();
    let brief = run(&config(), Arc::new(fetcher()), w).await;
    for lb in &brief.languages {
        let s = &lb.sections;
        for it in s.breaking.iter().chain(&s.headlines).chain(&s.quick) {
            assert!(w.contains(&it.published), "{} outside window", it.title);
            assert_eq!(it.published.offset().local_minus_utc(), 8 * 3600);
            assert!(!it.title.is_empty() && !it.link.is_empty());
        }
    }
    assert_eq!(brief.window_start, w.start);
    assert_eq!(brief.generated_at, w.end);
}

#[tokio::test]
async fn source_order_does_not_change_the_result() {
    let cfg = config();
    let mut reversed = cfg.clone();
    reversed.sources.reverse();

    let a = run(&cfg, Arc::new(fetcher()), window()).await;
    let b = run(&reversed, Arc::new(fetcher()), window()).await;
    assert_eq!(a, b);
}
