//! arXiv API client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::SearchError;
use super::parser::FeedParser;
use super::types::ArxivPaper;

/// Public arXiv Atom API.
pub const DEFAULT_ENDPOINT: &str = "https://export.arxiv.org/api/query";

/// Results requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Pause between page requests, per arXiv's API etiquette.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 3000;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Search provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Query endpoint.
    pub endpoint: String,
    /// Results requested per page.
    pub page_size: usize,
    /// Delay between consecutive page requests.
    pub page_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Thin client over the arXiv query API.
pub struct ArxivClient {
    config: SearchConfig,
    client: reqwest::Client,
}

impl ArxivClient {
    /// Create a client with a bounded request timeout.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("arxiv-daily/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    /// Newest-first results for `query`, at most `max_results` of them.
    #[tracing::instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ArxivPaper>, SearchError> {
        let page_size = self.config.page_size.max(1);
        let mut papers: Vec<ArxivPaper> = Vec::new();
        let mut start = 0;

        while papers.len() < max_results {
            if start > 0 && self.config.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }

            let wanted = (max_results - papers.len()).min(page_size);
            let page = self.fetch_page(query, start, wanted).await?;
            let received = page.len();
            tracing::debug!(start, wanted, received, "Fetched result page");

            papers.extend(page);
            if received < wanted {
                break;
            }
            start += received;
        }

        papers.truncate(max_results);
        Ok(papers)
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        max_results: usize,
    ) -> Result<Vec<ArxivPaper>, SearchError> {
        let start = start.to_string();
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("search_query", query),
                ("start", start.as_str()),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        FeedParser::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feed(ids: &[&str]) -> String {
        let entries: String = ids
            .iter()
            .map(|id| {
                format!(
                    "<entry><id>http://arxiv.org/abs/{id}v1</id>\
                     <updated>2024-06-09T10:00:00Z</updated>\
                     <title>Paper {id}</title>\
                     <author><name>Author {id}</name></author></entry>"
                )
            })
            .collect();
        format!(r#"<feed xmlns="http://www.w3.org/2005/Atom">{entries}</feed>"#)
    }

    fn client_for(server: &MockServer, page_size: usize) -> ArxivClient {
        ArxivClient::new(SearchConfig {
            endpoint: format!("{}/api/query", server.uri()),
            page_size,
            page_delay_ms: 0,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_sorted_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "\"TTS\" OR \"Text to Speech\""))
            .and(query_param("start", "0"))
            .and(query_param("max_results", "2"))
            .and(query_param("sortBy", "submittedDate"))
            .and(query_param("sortOrder", "descending"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&["2406.1", "2406.2"])))
            .expect(1)
            .mount(&server)
            .await;

        let papers = client_for(&server, 100)
            .search("\"TTS\" OR \"Text to Speech\"", 2)
            .await
            .unwrap();

        let ids: Vec<_> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2406.1", "2406.2"]);
    }

    #[tokio::test]
    async fn test_search_paginates_until_short_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&["1", "2"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("start", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&["3"])))
            .expect(1)
            .mount(&server)
            .await;

        let papers = client_for(&server, 2).search("\"x\"", 10).await.unwrap();
        assert_eq!(papers.len(), 3);
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(feed(&["1"]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = ArxivClient::new(SearchConfig {
            endpoint: format!("{}/api/query", server.uri()),
            page_size: 10,
            page_delay_ms: 0,
            timeout_secs: 1,
        })
        .unwrap();

        let err = client.search("\"x\"", 5).await.unwrap_err();
        match err {
            SearchError::Http(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, 10).search("\"x\"", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 503 }));
    }
}
