// src/render.rs
//! Static output: an HTML brief (`index.html` + `.nojekyll`) and an optional
//! JSON document with the same content.

use anyhow::{Context, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::brief::{Brief, LanguageBrief};
use crate::config::Lang;
use crate::item::Item;

pub const EMPTY_SENTINEL: &str = "-- empty --";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
    Both,
}

impl OutputFormat {
    fn html(self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::Both)
    }

    fn json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1"/>
<title>VoiceOfCrypto - Terminal Brief</title>
<style>
:root{--bg:#000;--fg:#00ff66;--dim:#00aa44;--line:rgba(0,255,102,.22);--lineStrong:rgba(0,255,102,.55);--hi:rgba(0,255,102,.10);
--font-en:"American Typewriter","Courier New",Courier,ui-monospace,Menlo,Consolas,monospace;
--font-zh:"Songti SC","SimSun","Noto Serif CJK SC","Source Han Serif SC",serif;}
body{margin:0;background:var(--bg);color:var(--fg);font-family:var(--font-en);}
.wrap{max-width:980px;margin:0 auto;padding:18px 14px 30px;}
.box{border:1px solid var(--line);padding:12px;margin:10px 0;}
.title{font-weight:800;}
.dim{color:var(--dim);}
a{color:var(--fg);}
.row{padding:10px 0;border-top:1px dashed var(--line);}
.pill{display:inline-block;padding:1px 8px;border:1px solid var(--line);margin:0 6px;}
.mono{font-weight:800;}
.breaking .row{border-top:1px solid var(--lineStrong);background:var(--hi);}
.breaking .row.empty{background:transparent;border-top:1px dashed var(--line);}
.zh{font-family:var(--font-zh);}
.zh .title,.zh .mono,.zh .pill{font-family:var(--font-en);}
</style>
</head>
<body>
<div class="wrap">
  <div class="box">
    <div class="title">CRYPTO::GLOBAL_NEWS_ALARM | VOICEofCRYPTO | TERMINAL BRIEF</div>
    <div class="dim">T+   : %%NOW%% (UTC%%OFFSET%%)</div>
    <div class="dim">WIN  : %%WIN_START%% &rarr; %%WIN_END%%</div>
  </div>
%%BODY%%
</div>
</body>
</html>
"#;

struct Labels {
    box_title: &'static str,
    box_class: &'static str,
    headlines: &'static str,
    breaking: &'static str,
    quick: &'static str,
}

fn labels(lang: Lang) -> Labels {
    match lang {
        Lang::Zh => Labels {
            box_title: "[中文简报]",
            box_class: "box zh",
            headlines: "[头条]",
            breaking: "[突发]",
            quick: "[快讯]",
        },
        Lang::En => Labels {
            box_title: "[EN BRIEF]",
            box_class: "box",
            headlines: "[HEADLINES]",
            breaking: "[BREAKING]",
            quick: "[QUICK_HITS]",
        },
        Lang::Other => Labels {
            box_title: "[OTHER BRIEF]",
            box_class: "box",
            headlines: "[HEADLINES]",
            breaking: "[BREAKING]",
            quick: "[QUICK_HITS]",
        },
    }
}

/// Only http(s) links become anchors; anything else is shown as plain text.
fn is_web_link(link: &str) -> bool {
    let l = link.trim_start().to_ascii_lowercase();
    l.starts_with("https://") || l.starts_with("http://")
}

/// Rows for one section; an empty section renders the sentinel row.
pub fn render_section(items: &[Item], prefix: char) -> String {
    if items.is_empty() {
        return format!(r#"<div class="row dim empty">{EMPTY_SENTINEL}</div>"#);
    }

    let mut out = String::new();
    for (i, it) in items.iter().enumerate() {
        let title = encode_text(&it.title);
        let headline = if is_web_link(&it.link) {
            format!(
                r#"<a class="t" href="{link}" target="_blank" rel="noreferrer">{title}</a>"#,
                link = encode_double_quoted_attribute(&it.link),
            )
        } else {
            format!(r#"<span class="t">{title}</span>"#)
        };
        let _ = write!(
            out,
            r#"<div class="row"><div><span class="mono">[{prefix}{n}]</span><span class="pill">[{score:.1}/10]</span><span class="pill dim">[{class}]</span> {headline}</div><div class="dim">&#8627; src: {source}</div></div>"#,
            n = i + 1,
            score = it.score,
            class = it.class,
            source = encode_text(&it.source),
        );
        out.push('\n');
    }
    out
}

fn render_language(lb: &LanguageBrief) -> String {
    let l = labels(lb.lang);
    format!(
        r#"  <div class="{class}">
    <div class="title">{title}</div>
    <div class="title dim">&gt; {h}</div>
{head}
    <div class="title dim">&gt; {b}</div><div class="breaking">
{brk}
    </div><div class="title dim">&gt; {q}</div>
{quick}
  </div>
"#,
        class = l.box_class,
        title = l.box_title,
        h = l.headlines,
        b = l.breaking,
        q = l.quick,
        head = render_section(&lb.sections.headlines, 'H'),
        brk = render_section(&lb.sections.breaking, 'B'),
        quick = render_section(&lb.sections.quick, 'Q'),
    )
}

pub fn render_html(brief: &Brief) -> String {
    let body: String = brief.languages.iter().map(render_language).collect();
    PAGE.replace("%%NOW%%", &brief.generated_at.format("%Y-%m-%d %H:%M:%S").to_string())
        .replace("%%OFFSET%%", &brief.generated_at.format("%:z").to_string())
        .replace("%%WIN_START%%", &brief.window_start.format("%H:%M").to_string())
        .replace("%%WIN_END%%", &brief.window_end.format("%H:%M").to_string())
        .replace("%%BODY%%", &body)
}

pub fn render_json(brief: &Brief) -> Result<String> {
    serde_json::to_string_pretty(brief).context("serializing brief")
}

/// Write the requested outputs into `out_dir`, creating it if needed.
pub fn write_site(out_dir: &Path, brief: &Brief, format: OutputFormat) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))?;

    let mut written = Vec::new();
    if format.html() {
        let marker = out_dir.join(".nojekyll");
        fs::write(&marker, "").with_context(|| format!("writing {}", marker.display()))?;
        let index = out_dir.join("index.html");
        fs::write(&index, render_html(brief))
            .with_context(|| format!("writing {}", index.display()))?;
        written.push(index);
    }
    if format.json() {
        let path = out_dir.join("brief.json");
        fs::write(&path, render_json(brief)?)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_support::item;

    #[test]
    fn empty_section_shows_sentinel() {
        let html = render_section(&[], 'B');
        assert!(html.contains(EMPTY_SENTINEL));
        assert!(html.contains("empty"));
    }

    #[test]
    fn rows_escape_and_number() {
        let mut it = item("<script>alert(1)</script> & co", "https://x.test/?a=1&b=\"2\"", 9.0, 0);
        it.source = "A&B".into();
        let html = render_section(&[it.clone(), it], 'H');
        assert!(html.contains("[H1]"));
        assert!(html.contains("[H2]"));
        assert!(html.contains("[9.0/10]"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("src: A&amp;B"));
        assert!(!html.contains("b=\"2\""));
    }

    #[test]
    fn non_web_links_render_as_text() {
        let js = item("Click me", "javascript:alert(1)", 5.0, 0);
        let mixed_case = item("Or me", " JaVaScRiPt:alert(2)", 5.0, 0);
        let html = render_section(&[js, mixed_case], 'Q');
        assert!(!html.to_ascii_lowercase().contains("javascript:"));
        assert!(!html.contains("href="));
        assert!(html.contains(r#"<span class="t">Click me</span>"#));

        let web = render_section(&[item("Fine", "HTTPS://x.test/a", 5.0, 0)], 'Q');
        assert!(web.contains(r#"href="HTTPS://x.test/a""#));
    }
}
