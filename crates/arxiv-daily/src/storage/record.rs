//! Paper rows and their persisted pipe-delimited form.
//!
//! A row is persisted as a single Markdown table line:
//!
//! ```text
//! |**2024-06-07**|**Title**|Author et.al.|[2406.04843](http://arxiv.org/abs/2406.04843)|null|
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rendered in the code column when there is no code link.
const NO_CODE: &str = "null";

/// Suffix appended to the first author.
const AUTHOR_SUFFIX: &str = " et.al.";

/// One paper as stored under a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRow {
    /// Normalized arXiv id (no version suffix).
    pub id: String,
    /// Publish (last updated) date.
    pub date: NaiveDate,
    /// Paper title.
    pub title: String,
    /// First listed author.
    pub first_author: String,
    /// Canonical abstract URL.
    pub url: String,
    /// Code link, if one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Author comment from the feed. Not part of the persisted row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl PaperRow {
    /// Render the persisted table line, including the trailing newline.
    #[must_use]
    pub fn to_row(&self) -> String {
        format!(
            "|**{}**|**{}**|{}{AUTHOR_SUFFIX}|[{}]({})|{}|\n",
            self.date.format("%Y-%m-%d"),
            self.title,
            self.first_author,
            self.id,
            self.url,
            self.code.as_deref().unwrap_or(NO_CODE),
        )
    }

    /// Parse a persisted table line.
    ///
    /// The date is taken from the first field and the author, link and code
    /// fields from the right, so a title may itself contain `|`. Only rows
    /// that `to_row` reproduces byte for byte are accepted.
    #[must_use]
    pub fn parse_row(row: &str) -> Option<Self> {
        let parsed = Self::parse_fields(row)?;
        (parsed.to_row() == row).then_some(parsed)
    }

    fn parse_fields(row: &str) -> Option<Self> {
        let inner = row.trim_end().strip_prefix('|')?.strip_suffix('|')?;

        let (date_field, rest) = inner.split_once('|')?;
        let date = parse_bold_date(date_field)?;

        let mut tail = rest.rsplitn(4, '|');
        let code_field = tail.next()?;
        let link_field = tail.next()?;
        let author_field = tail.next()?;
        let title_field = tail.next()?;

        let (id, url) = parse_link(link_field)?;
        let code = match code_field.trim() {
            "" | NO_CODE => None,
            other => Some(other.to_string()),
        };
        let author = author_field.trim();
        let first_author = author
            .strip_suffix(AUTHOR_SUFFIX.trim_start())
            .unwrap_or(author)
            .trim_end()
            .to_string();

        Some(Self {
            id,
            date,
            title: strip_bold(title_field).to_string(),
            first_author,
            url,
            code,
            comment: None,
        })
    }
}

/// A value in a topic's paper map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredRow {
    /// A row in the expected format.
    Paper(PaperRow),
    /// A string that is not a canonical row; written back unchanged.
    Legacy(String),
    /// A JSON `null`.
    Empty,
}

impl StoredRow {
    /// Interpret a persisted row string.
    #[must_use]
    pub fn from_persisted(raw: &str) -> Self {
        match PaperRow::parse_row(raw) {
            Some(paper) => Self::Paper(paper),
            None => Self::Legacy(raw.to_string()),
        }
    }

    /// The structured paper, if this row has one.
    #[must_use]
    pub fn paper(&self) -> Option<&PaperRow> {
        match self {
            Self::Paper(p) => Some(p),
            _ => None,
        }
    }

    /// Publish date, if known.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.paper().map(|p| p.date)
    }

    /// Text written to the document and the JSON record; `None` for `Empty`.
    #[must_use]
    pub fn display_row(&self) -> Option<String> {
        match self {
            Self::Paper(p) => Some(p.to_row()),
            Self::Legacy(raw) => Some(raw.clone()),
            Self::Empty => None,
        }
    }
}

impl From<PaperRow> for StoredRow {
    fn from(paper: PaperRow) -> Self {
        Self::Paper(paper)
    }
}

fn strip_bold(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix("**")
        .and_then(|f| f.strip_suffix("**"))
        .unwrap_or(field)
        .trim()
}

fn parse_bold_date(field: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(strip_bold(field), "%Y-%m-%d").ok()
}

/// Split `[id](url)` into its parts.
fn parse_link(field: &str) -> Option<(String, String)> {
    let field = field.trim();
    let (label, rest) = field.strip_prefix('[')?.split_once("](")?;
    let url = rest.strip_suffix(')')?;
    Some((label.to_string(), url.to_string()))
}
