//! Markdown document generation from the paper record.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use std::sync::LazyLock;

use super::store::{sort_papers, PaperStore};

/// First-to-last `$` on a line; rows only ever carry one math span.
static MATH_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$.*\$").expect("math span regex is valid"));

const TABLE_HEADER: &str = "|Publish Date|Title|Authors|PDF|Code|\n|---|---|---|---|---|\n";

const WEB_TABLE_HEADER: &str = "| Publish Date | Title | Authors | PDF | Code |\n\
                                |:---------|:-----------------------|:---------|:------|:------|\n";

/// Layout switches for the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Use a `##` title and per-topic table headers.
    pub use_title: bool,
    /// Emit a table of contents.
    pub use_tc: bool,
    /// Emit a "back to top" link after each topic.
    pub use_b2t: bool,
    /// Use the padded table header for the GitHub Pages variant.
    pub to_web: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            use_title: true,
            use_tc: true,
            use_b2t: true,
            to_web: false,
        }
    }
}

/// Renders the whole record into one Markdown document.
pub struct MarkdownRenderer {
    options: RenderOptions,
    date: NaiveDate,
}

impl MarkdownRenderer {
    /// Create a renderer stamping documents with `date`.
    #[must_use]
    pub fn new(options: RenderOptions, date: NaiveDate) -> Self {
        Self { options, date }
    }

    /// Render the record and replace the file at `path`.
    pub fn write(&self, store: &PaperStore, path: &Path) -> Result<()> {
        let content = self.render(store);
        super::write_atomic(path, &content)
            .with_context(|| format!("Failed to write document {}", path.display()))?;

        tracing::info!(path = %path.display(), bytes = content.len(), "Wrote document");
        Ok(())
    }

    /// Render the record as Markdown.
    #[must_use]
    pub fn render(&self, store: &PaperStore) -> String {
        let mut md = String::new();
        let date_label = self.date.format("%Y.%m.%d").to_string();

        if self.options.use_title {
            let _ = writeln!(md, "## Updated on {date_label}");
        } else {
            let _ = writeln!(md, "> Updated on {date_label}");
        }
        md.push_str("> Usage instructions: [here](./docs/README.md#usage)\n\n");

        if self.options.use_tc {
            md.push_str("<details>\n");
            md.push_str("  <summary>Table of Contents</summary>\n");
            md.push_str("  <ol>\n");
            for (topic, papers) in store.topics() {
                if papers.is_empty() {
                    continue;
                }
                let _ = writeln!(
                    md,
                    "    <li><a href=#{}>{topic}</a></li>",
                    topic_anchor(topic)
                );
            }
            md.push_str("  </ol>\n");
            md.push_str("</details>\n\n");
        }

        for (topic, papers) in store.topics() {
            if papers.is_empty() {
                continue;
            }

            let _ = writeln!(md, "## {topic}\n");

            if self.options.use_title {
                md.push_str(if self.options.to_web {
                    WEB_TABLE_HEADER
                } else {
                    TABLE_HEADER
                });
            }

            for (_, row) in sort_papers(topic, papers) {
                let Some(line) = row.display_row() else {
                    continue;
                };
                md.push_str(&pretty_math(&line));
                if !line.ends_with('\n') {
                    md.push('\n');
                }
            }

            md.push('\n');

            if self.options.use_b2t {
                let _ = writeln!(
                    md,
                    "<p align=right>(<a href={}>back to top</a>)</p>\n",
                    self.top_anchor()
                );
            }
        }

        md
    }

    /// Anchor of the "Updated on" heading, e.g. `#updated-on-20240610`.
    fn top_anchor(&self) -> String {
        format!("#Updated on {}", self.date.format("%Y.%m.%d"))
            .replace(' ', "-")
            .replace('.', "")
            .to_lowercase()
    }
}

/// Anchor id of a topic heading.
fn topic_anchor(topic: &str) -> String {
    topic.replace(' ', "-").to_lowercase()
}

/// Pad the first inline math span with single spaces.
///
/// A space is added on a side only when the neighbouring character is
/// neither a space nor `*`; whitespace inside the span is trimmed.
#[must_use]
pub fn pretty_math(s: &str) -> String {
    let Some(m) = MATH_SPAN.find(s) else {
        return s.to_string();
    };

    let before = &s[..m.start()];
    let after = &s[m.end()..];
    let span = m.as_str();
    let inner = span[1..span.len() - 1].trim();

    let lead = match before.chars().next_back() {
        Some(c) if c != ' ' && c != '*' => " ",
        _ => "",
    };
    let trail = match after.chars().next() {
        Some(c) if c != ' ' && c != '*' => " ",
        _ => "",
    };

    format!("{before}{lead}${inner}${trail}{after}")
}
