//! Atom feed parser for arXiv API responses.

use chrono::{DateTime, NaiveDate};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::error::SearchError;
use super::types::{abs_url, normalize_id, short_id, ArxivPaper};

/// Parser for arXiv Atom query responses.
pub struct FeedParser;

/// Fields collected while inside one `<entry>`.
#[derive(Debug, Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    updated: String,
    published: String,
    authors: Vec<String>,
    comment: Option<String>,
}

impl FeedParser {
    /// Parse every `<entry>` of a feed, in feed order.
    ///
    /// Entries without an id, author or usable date are skipped with a
    /// warning. An arXiv error entry becomes `SearchError::Api`.
    pub fn parse(xml: &str) -> Result<Vec<ArxivPaper>, SearchError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut papers = Vec::new();
        let mut entry: Option<EntryBuilder> = None;
        let mut in_author = false;
        let mut text = String::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                SearchError::Feed(format!("at byte {}: {e}", reader.buffer_position()))
            })?;

            match event {
                Event::Eof => break,
                Event::Start(e) => match e.local_name().as_ref() {
                    b"entry" => entry = Some(EntryBuilder::default()),
                    b"author" => in_author = entry.is_some(),
                    _ => text.clear(),
                },
                Event::Text(t) => {
                    if entry.is_some() {
                        let unescaped =
                            t.unescape().map_err(|e| SearchError::Feed(e.to_string()))?;
                        text.push_str(&unescaped);
                    }
                }
                Event::CData(c) => {
                    if entry.is_some() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::End(e) => {
                    let Some(current) = entry.as_mut() else {
                        text.clear();
                        continue;
                    };
                    let value = collapse_ws(&text);
                    match e.local_name().as_ref() {
                        b"entry" => {
                            if let Some(done) = entry.take() {
                                if let Some(paper) = done.finish()? {
                                    papers.push(paper);
                                }
                            }
                        }
                        b"author" => in_author = false,
                        b"name" if in_author => current.authors.push(value),
                        b"id" => current.id = value,
                        b"title" => current.title = value,
                        b"summary" => current.summary = value,
                        b"updated" => current.updated = value,
                        b"published" => current.published = value,
                        b"comment" => current.comment = Some(value).filter(|c| !c.is_empty()),
                        _ => {}
                    }
                    text.clear();
                }
                _ => {}
            }
        }

        tracing::debug!(count = papers.len(), "Parsed feed entries");
        Ok(papers)
    }
}

impl EntryBuilder {
    fn finish(self) -> Result<Option<ArxivPaper>, SearchError> {
        if self.id.contains("/api/errors") {
            let reason = if self.summary.is_empty() {
                self.title
            } else {
                self.summary
            };
            return Err(SearchError::Api(reason));
        }

        if self.id.is_empty() {
            tracing::warn!(title = %self.title, "Feed entry without id, skipping");
            return Ok(None);
        }

        let updated = parse_feed_date(&self.updated).or_else(|| parse_feed_date(&self.published));
        let Some(updated) = updated else {
            tracing::warn!(id = %self.id, "Feed entry without a usable date, skipping");
            return Ok(None);
        };

        let Some(first_author) = self.authors.into_iter().next() else {
            tracing::warn!(id = %self.id, "Feed entry without authors, skipping");
            return Ok(None);
        };

        let id = normalize_id(&short_id(&self.id));
        Ok(Some(ArxivPaper {
            url: abs_url(&id),
            id,
            title: self.title,
            first_author,
            updated,
            comment: self.comment,
        }))
    }
}

/// Calendar date of an Atom timestamp (`2024-06-07T17:59:59Z`).
fn parse_feed_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=all:"TTS"</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2024-06-10T00:00:00-04:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2406.04843v2</id>
    <updated>2024-06-09T17:59:59Z</updated>
    <published>2024-06-07T10:00:00Z</published>
    <title>Variational Flow Matching
      for $\mathcal{O}(1)$ Speech</title>
    <summary>We propose...</summary>
    <author><name>Jane Doe</name></author>
    <author><name>John Roe</name></author>
    <arxiv:comment>12 pages &amp; 3 figures</arxiv:comment>
    <link href="http://arxiv.org/abs/2406.04843v2" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2406.01111v1</id>
    <updated>2024-06-03T08:00:00Z</updated>
    <published>2024-06-03T08:00:00Z</published>
    <title>Second Paper</title>
    <author><name>Li Wei</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_entries() {
        let papers = FeedParser::parse(SAMPLE_FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.id, "2406.04843");
        assert_eq!(first.url, "http://arxiv.org/abs/2406.04843");
        assert_eq!(first.title, r"Variational Flow Matching for $\mathcal{O}(1)$ Speech");
        assert_eq!(first.first_author, "Jane Doe");
        assert_eq!(first.updated, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert_eq!(first.comment.as_deref(), Some("12 pages & 3 figures"));

        assert_eq!(papers[1].id, "2406.01111");
        assert_eq!(papers[1].comment, None);
    }

    #[test]
    fn test_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>none</title></feed>"#;
        assert!(FeedParser::parse(xml).unwrap().is_empty());
    }

    #[test]
    fn test_error_entry() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
            <title>Error</title>
            <summary>incorrect id format for 1234</summary>
          </entry>
        </feed>"#;
        let err = FeedParser::parse(xml).unwrap_err();
        assert!(matches!(err, SearchError::Api(ref m) if m == "incorrect id format for 1234"));
    }

    #[test]
    fn test_entry_without_author_is_skipped() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <id>http://arxiv.org/abs/2406.1v1</id>
            <updated>2024-06-09T17:59:59Z</updated>
            <title>Orphan</title>
          </entry>
        </feed>"#;
        assert!(FeedParser::parse(xml).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_feed_is_error() {
        let xml = r#"<feed><entry><id>x</id></feed>"#;
        assert!(matches!(FeedParser::parse(xml), Err(SearchError::Feed(_))));
    }

    #[test]
    fn test_parse_feed_date_variants() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(parse_feed_date("2024-06-09T17:59:59Z"), Some(day));
        assert_eq!(parse_feed_date("2024-06-09"), Some(day));
        assert_eq!(parse_feed_date(""), None);
        assert_eq!(parse_feed_date("soon"), None);
    }
}
