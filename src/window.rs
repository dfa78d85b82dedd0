//! # Window Filter
//! Keeps entries whose publication time falls inside a closed `[start, end]`
//! interval expressed in one reference offset, and drops entries that lack a
//! usable title, link or timestamp.
//!
//! Timestamp formats tried in order: RFC 2822, RFC 3339, then a handful of
//! naive layouts which are read as UTC. Anything else counts as absent.
//! Drops are silent (debug trace plus a labelled counter), never errors.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, Utc};
use metrics::counter;

use crate::ingest::clean_text;
use crate::ingest::types::RawEntry;

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Closed time interval in a single reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl Window {
    /// `[now - hours, now]` in `tz`. Fails when the start is not representable.
    pub fn ending_at(now: DateTime<Utc>, hours: u32, tz: FixedOffset) -> Result<Self> {
        let end = now.with_timezone(&tz);
        let start = end
            .checked_sub_signed(Duration::hours(i64::from(hours)))
            .with_context(|| format!("window of {hours}h before {end} is out of range"))?;
        Ok(Self { start, end })
    }

    pub fn tz(&self) -> FixedOffset {
        *self.end.offset()
    }

    pub fn contains(&self, t: &DateTime<FixedOffset>) -> bool {
        self.start <= *t && *t <= self.end
    }
}

/// An entry that passed the window and completeness checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    /// Publication time in the window's offset.
    pub published: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NoTimestamp,
    OutsideWindow,
    MissingTitle,
    MissingLink,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::NoTimestamp => "no_timestamp",
            DropReason::OutsideWindow => "outside_window",
            DropReason::MissingTitle => "missing_title",
            DropReason::MissingLink => "missing_link",
        }
    }
}

/// Parse a feed timestamp. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a reference offset such as `+08:00`, `-0530`, `+8`, `UTC` or `Z`.
pub fn parse_offset(raw: &str) -> Result<FixedOffset> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }
    if !s.is_ascii() {
        bail!("offset `{s}` must be ASCII");
    }
    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => bail!("offset `{s}` must start with + or -"),
    };
    let (h, m) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = h.parse().with_context(|| format!("offset hours in `{s}`"))?;
    let minutes: i32 = m.parse().with_context(|| format!("offset minutes in `{s}`"))?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        bail!("offset `{s}` out of range");
    }
    let secs = sign * (hours * 3600 + minutes * 60);
    FixedOffset::east_opt(secs).with_context(|| format!("offset `{s}` out of range"))
}

/// Check one entry against the window and the completeness rules.
pub fn admit(entry: &RawEntry, window: &Window) -> Result<Candidate, DropReason> {
    let ts = entry
        .raw_timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or(DropReason::NoTimestamp)?;
    let published = ts.with_timezone(&window.tz());
    if !window.contains(&published) {
        return Err(DropReason::OutsideWindow);
    }

    let title = entry.title.as_deref().map(clean_text).unwrap_or_default();
    if title.is_empty() {
        return Err(DropReason::MissingTitle);
    }
    let link = entry.link.as_deref().map(str::trim).unwrap_or_default();
    if link.is_empty() {
        return Err(DropReason::MissingLink);
    }

    Ok(Candidate {
        title,
        link: link.to_string(),
        published,
    })
}

/// Keep the entries that pass `admit`, in input order.
pub fn filter_entries(source_id: &str, entries: &[RawEntry], window: &Window) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match admit(entry, window) {
            Ok(c) => out.push(c),
            Err(reason) => {
                tracing::debug!(source = source_id, reason = reason.as_str(), "entry dropped");
                counter!("brief_dropped_total", "reason" => reason.as_str()).increment(1);
            }
        }
    }
    out
}
