//! Search provider errors.

use thiserror::Error;

/// Errors from a single arXiv query.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport error or timeout
    #[error("arXiv request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("arXiv returned HTTP {status}")]
    Status { status: u16 },

    /// Response body is not a readable Atom feed
    #[error("Malformed Atom feed: {0}")]
    Feed(String),

    /// arXiv answered with an error entry (bad query syntax etc.)
    #[error("arXiv rejected the query: {0}")]
    Api(String),
}
