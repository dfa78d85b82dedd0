//! Topic classification by keyword substrings over the lower-cased title.
//!
//! Categories are checked in a fixed priority order and the first hit wins:
//! Security, Regulation, Biz/Capital, Markets, then General.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Security,
    Regulation,
    #[serde(rename = "Biz/Capital")]
    BizCapital,
    Markets,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Regulation => "Regulation",
            Category::BizCapital => "Biz/Capital",
            Category::Markets => "Markets",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority order matters: a title hitting several lists gets the earliest.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::Security,
        &["hack", "exploit", "drain", "scam", "phishing", "ransom", "breach"],
    ),
    (
        Category::Regulation,
        &["sec", "regulat", "bill", "law", "court", "lawsuit", "ban", "fine", "probe"],
    ),
    (
        Category::BizCapital,
        &["etf", "raises", "raise", "series", "funding", "acquire", "acquisition", "merger"],
    ),
    (
        Category::Markets,
        &["btc", "bitcoin", "eth", "ether", "price", "market", "liquidat", "dump", "pump"],
    ),
];

pub fn classify(title: &str) -> Category {
    let t = title.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| t.contains(k)))
        .map(|(cat, _)| *cat)
        .unwrap_or(Category::General)
}
