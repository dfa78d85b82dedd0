// src/ingest/providers/feed.rs
//! RSS 2.0 / Atom document parsing into `RawEntry` records.

use anyhow::{bail, Context, Result};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::ingest::types::RawEntry;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

/// Every field is a list: quick-xml drops namespace prefixes, so
/// `<atom:link>` lands next to `<link>` and `<dc:date>` under `date`.
#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Vec<Text>,
    #[serde(default)]
    link: Vec<Text>,
    #[serde(default)]
    published: Vec<Text>,
    #[serde(default)]
    updated: Vec<Text>,
    #[serde(rename = "pubDate", default)]
    pub_date: Vec<Text>,
    #[serde(default)]
    date: Vec<Text>,
}

/// Text content of an element; attributes are ignored.
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

/// First non-blank text among repeated elements.
fn first_text(v: Vec<Text>) -> Option<String> {
    v.into_iter()
        .filter_map(|t| t.value)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Vec<Text>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    #[serde(default)]
    published: Vec<Text>,
    #[serde(default)]
    updated: Vec<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel) wins; otherwise the first href.
    fn best_link(&self) -> Option<String> {
        self.link
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.clone())
    }
}

/// Timestamp preference order: published, updated, pubDate, dc:date.
fn pick_timestamp(candidates: [Vec<Text>; 4]) -> Option<String> {
    candidates.into_iter().find_map(first_text)
}

/// Parse a feed document, keeping at most `max_entries` in document order.
pub fn parse_feed(xml: &str, max_entries: usize) -> Result<Vec<RawEntry>> {
    let t0 = std::time::Instant::now();
    let xml_clean = flatten_xhtml_titles(&scrub_html_entities_for_xml(xml));

    let out: Vec<RawEntry> = match root_element(&xml_clean).as_deref() {
        Some("rss") => {
            let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
            rss.channel
                .item
                .into_iter()
                .take(max_entries)
                .map(|it| RawEntry {
                    title: first_text(it.title),
                    link: first_text(it.link),
                    raw_timestamp: pick_timestamp([it.published, it.updated, it.pub_date, it.date]),
                })
                .collect()
        }
        Some("feed") => {
            let feed: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
            feed.entry
                .into_iter()
                .take(max_entries)
                .map(|e| {
                    let link = e.best_link();
                    RawEntry {
                        title: first_text(e.title),
                        link,
                        raw_timestamp: pick_timestamp([e.published, e.updated, Vec::new(), Vec::new()]),
                    }
                })
                .collect()
        }
        Some(other) => bail!("unsupported feed root element <{other}>"),
        None => bail!("feed document has no root element"),
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("brief_parse_ms").record(ms);
    counter!("brief_entries_total").increment(out.len() as u64);
    Ok(out)
}

/// Lower-cased local name of the first element in the document.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// HTML named entities are not defined in XML. Decode them to text, keep the
/// five XML ones and numeric references, and escape stray ampersands.
fn scrub_html_entities_for_xml(s: &str) -> String {
    static RE_AMP: OnceCell<Regex> = OnceCell::new();
    let re = RE_AMP.get_or_init(|| {
        Regex::new(r"&(#[0-9]+;|#[xX][0-9A-Fa-f]+;|[A-Za-z][A-Za-z0-9]*;)?").unwrap()
    });
    re.replace_all(s, |caps: &Captures| {
        let Some(m) = caps.get(1) else {
            return "&amp;".to_string();
        };
        let entity = m.as_str();
        if entity.starts_with('#') {
            return format!("&{entity}");
        }
        match entity.trim_end_matches(';') {
            "amp" | "lt" | "gt" | "quot" | "apos" => format!("&{entity}"),
            "nbsp" => " ".to_string(),
            name => {
                let raw = format!("&{entity}");
                let decoded = html_escape::decode_html_entities(&raw);
                if decoded == raw {
                    // unknown name: keep it as literal text
                    format!("&amp;{name};")
                } else {
                    escape(&decoded).into_owned()
                }
            }
        }
    })
    .into_owned()
}

/// Atom `type="xhtml"` titles carry markup; keep only their text.
fn flatten_xhtml_titles(s: &str) -> String {
    static RE_XHTML: OnceCell<Regex> = OnceCell::new();
    static RE_TAG: OnceCell<Regex> = OnceCell::new();
    let re = RE_XHTML.get_or_init(|| {
        Regex::new(r#"(?s)<title(\s[^>]*type\s*=\s*["']xhtml["'][^>]*)>(.*?)</title>"#).unwrap()
    });
    let tag = RE_TAG.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    re.replace_all(s, |caps: &Captures| {
        format!("<title{}>{}</title>", &caps[1], tag.replace_all(&caps[2], ""))
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>Exchange hacked&nbsp;for $50M</title>
      <link>https://example.test/a</link>
      <pubDate>Tue, 10 Jun 2025 03:00:00 GMT</pubDate>
    </item>
    <item>
      <title><![CDATA[ETF flows <b>surge</b>]]></title>
      <link>https://example.test/b</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom test</title>
  <entry>
    <title type="html">Court rules on token case</title>
    <link rel="self" href="https://example.test/self"/>
    <link rel="alternate" href="https://example.test/post"/>
    <updated>2025-06-10T04:00:00Z</updated>
    <published>2025-06-10T03:30:00+08:00</published>
  </entry>
</feed>"#;

    #[test]
    fn rss_items_keep_optional_fields() {
        let out = parse_feed(RSS, 80).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title.as_deref(), Some("Exchange hacked for $50M"));
        assert_eq!(
            out[0].raw_timestamp.as_deref(),
            Some("Tue, 10 Jun 2025 03:00:00 GMT")
        );
        assert_eq!(out[1].title.as_deref(), Some("ETF flows <b>surge</b>"));
        assert!(out[1].raw_timestamp.is_none());
    }

    #[test]
    fn atom_prefers_published_and_alternate_link() {
        let out = parse_feed(ATOM, 80).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link.as_deref(), Some("https://example.test/post"));
        assert_eq!(
            out[0].raw_timestamp.as_deref(),
            Some("2025-06-10T03:30:00+08:00")
        );
    }

    #[test]
    fn max_entries_caps_document_order() {
        let out = parse_feed(RSS, 1).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link.as_deref(), Some("https://example.test/a"));
    }

    #[test]
    fn namespaced_link_does_not_sink_the_feed() {
        let xml = r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom"><channel>
  <atom:link href="https://example.test/feed" rel="self"/>
  <item>
    <title>Exchange hacked</title>
    <link>https://example.test/a</link>
    <atom:link href="https://example.test/a.amp" rel="amphtml"/>
    <pubDate>Tue, 10 Jun 2025 03:00:00 GMT</pubDate>
  </item>
  <item>
    <title>ETF inflows</title>
    <atom:link href="https://example.test/b.amp" rel="amphtml"/>
    <link>https://example.test/b</link>
  </item>
</channel></rss>"#;
        let out = parse_feed(xml, 80).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].link.as_deref(), Some("https://example.test/a"));
        assert_eq!(out[1].link.as_deref(), Some("https://example.test/b"));
    }

    #[test]
    fn html_entities_and_bare_ampersands_are_tolerated() {
        let xml = r#"<rss version="2.0"><channel>
  <item><title>Caf&eacute; exchange hacked &bogus; AT&T</title><link>https://example.test/a?x=1&y=2</link></item>
  <item><title>Second &amp; &#233;</title><link>https://example.test/b</link></item>
</channel></rss>"#;
        let out = parse_feed(xml, 80).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].title.as_deref(),
            Some("Caf\u{e9} exchange hacked &bogus; AT&T")
        );
        assert_eq!(out[0].link.as_deref(), Some("https://example.test/a?x=1&y=2"));
        assert_eq!(out[1].title.as_deref(), Some("Second & \u{e9}"));
    }

    #[test]
    fn dc_date_is_the_last_resort_timestamp() {
        let xml = r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
  <item><title>A</title><link>https://example.test/a</link><dc:date>2025-06-10T03:00:00Z</dc:date></item>
  <item><title>B</title><link>https://example.test/b</link><dc:date>2025-06-10T01:00:00Z</dc:date><pubDate>Tue, 10 Jun 2025 02:00:00 GMT</pubDate></item>
</channel></rss>"#;
        let out = parse_feed(xml, 80).unwrap();
        assert_eq!(out[0].raw_timestamp.as_deref(), Some("2025-06-10T03:00:00Z"));
        assert_eq!(
            out[1].raw_timestamp.as_deref(),
            Some("Tue, 10 Jun 2025 02:00:00 GMT")
        );
    }

    #[test]
    fn xhtml_atom_title_keeps_its_text() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">Bridge <b>exploit</b> drains vault</div></title>
    <link href="https://example.test/x"/>
    <updated>2025-06-10T03:00:00Z</updated>
  </entry>
</feed>"#;
        let out = parse_feed(xml, 80).unwrap();
        assert_eq!(out[0].title.as_deref(), Some("Bridge exploit drains vault"));
    }

    #[test]
    fn unknown_root_is_an_error() {
        assert!(parse_feed("<html><body/></html>", 80).is_err());
        assert!(parse_feed("", 80).is_err());
    }
}
