//! arXiv data types.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::storage::PaperRow;

/// Trailing version marker on an arXiv id (`v1`, `v12`).
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+$").expect("version suffix regex is valid"));

/// Base of the canonical abstract URL.
pub const ABS_URL_BASE: &str = "http://arxiv.org/abs/";

/// One search result, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxivPaper {
    /// Id with the version marker stripped.
    pub id: String,
    /// Title with whitespace collapsed.
    pub title: String,
    /// First listed author.
    pub first_author: String,
    /// Calendar date of the last update.
    pub updated: NaiveDate,
    /// Canonical abstract URL.
    pub url: String,
    /// Author comment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ArxivPaper {
    /// Convert into a storable row.
    #[must_use]
    pub fn into_row(self) -> PaperRow {
        PaperRow {
            id: self.id,
            date: self.updated,
            title: self.title,
            first_author: self.first_author,
            url: self.url,
            code: None,
            comment: self.comment,
        }
    }
}

/// Short id from an entry id URL, e.g. `http://arxiv.org/abs/2108.09112v1`
/// gives `2108.09112v1`.
#[must_use]
pub fn short_id(entry_id: &str) -> String {
    let trimmed = entry_id.trim().trim_end_matches('/');
    match trimmed.find("/abs/") {
        Some(pos) => trimmed[pos + "/abs/".len()..].to_string(),
        None => trimmed.rsplit('/').next().unwrap_or(trimmed).to_string(),
    }
}

/// Strip a trailing version marker: `2108.09112v1` -> `2108.09112`.
#[must_use]
pub fn normalize_id(short_id: &str) -> String {
    VERSION_SUFFIX.replace(short_id.trim(), "").into_owned()
}

/// Canonical abstract URL for a normalized id.
#[must_use]
pub fn abs_url(id: &str) -> String {
    format!("{ABS_URL_BASE}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("http://arxiv.org/abs/2108.09112v1"), "2108.09112v1");
        assert_eq!(short_id("http://arxiv.org/abs/hep-th/9901001v2"), "hep-th/9901001v2");
        assert_eq!(short_id("2401.00001v3"), "2401.00001v3");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("2108.09112v1"), "2108.09112");
        assert_eq!(normalize_id("2108.09112v12"), "2108.09112");
        assert_eq!(normalize_id("2108.09112"), "2108.09112");
        assert_eq!(normalize_id("solv-int/9901001v2"), "solv-int/9901001");
    }

    #[test]
    fn test_into_row_keeps_fields() {
        let paper = ArxivPaper {
            id: "2406.04843".to_string(),
            title: "T".to_string(),
            first_author: "A".to_string(),
            updated: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            url: abs_url("2406.04843"),
            comment: Some("Accepted at X".to_string()),
        };
        let row = paper.into_row();
        assert_eq!(row.url, "http://arxiv.org/abs/2406.04843");
        assert_eq!(row.code, None);
        assert_eq!(row.comment.as_deref(), Some("Accepted at X"));
    }
}
