//! Digest content generator.
//!
//! Builds the plain-text message for a digest window.

use notify::Message;
use std::fmt::Write;

use super::window::DigestWindow;
use crate::config::DigestSettings;

/// Titles longer than this are cut.
const MAX_TITLE_CHARS: usize = 50;

/// Characters kept from a cut title before the ellipsis.
const KEPT_TITLE_CHARS: usize = MAX_TITLE_CHARS - 3;

/// Generates digest messages.
pub struct DigestGenerator;

impl DigestGenerator {
    /// Generate the plain-text digest for a window.
    #[must_use]
    pub fn generate_text(window: &DigestWindow, settings: &DigestSettings) -> Message {
        let date_str = window.date().format("%Y-%m-%d").to_string();
        let mut text = format!("📚 {} {date_str}", settings.title);

        if window.is_empty() {
            text.push_str("\n\nNo new papers today.");
            return Message::new(settings.title.clone(), text);
        }

        let mut total = 0;
        for (topic, papers) in window.topics() {
            total += papers.len();
            let _ = write!(text, "\n\n🔍 {topic} ({} papers)", papers.len());

            for paper in papers.values() {
                let _ = write!(
                    text,
                    "\n• {title}\n  👤 {author} et.al.\n  🔗 {url}",
                    title = truncate_title(&paper.title),
                    author = paper.first_author,
                    url = paper.url,
                );
            }
        }

        if total > 0 {
            let _ = write!(text, "\n\n📊 {total} papers updated today");
            if let Some(archive) = &settings.archive_url {
                let _ = write!(text, "\n\n🔗 Full list: {archive}");
            }
        }

        Message::new(settings.title.clone(), text)
    }

    /// Message sent by `test-notify`.
    #[must_use]
    pub fn test_message(settings: &DigestSettings) -> Message {
        Message::new(
            format!("{} test", settings.title),
            format!(
                "🔧 {} test message\n\nIf you can read this, digest delivery is configured correctly.",
                settings.title
            ),
        )
    }
}

/// Cut a title to at most 50 characters, respecting UTF-8 boundaries.
fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        title.to_string()
    } else {
        let truncated: String = title.chars().take(KEPT_TITLE_CHARS).collect();
        format!("{truncated}...")
    }
}
