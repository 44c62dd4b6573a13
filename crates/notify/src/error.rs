//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when sending notifications.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed (transport error or timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel is missing its credential
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Configured delivery method is not known
    #[error("Unsupported delivery method: {0}")]
    UnsupportedMethod(String),

    /// Non-success HTTP status
    #[error("{channel} returned {status}: {body}")]
    Status {
        channel: &'static str,
        status: u16,
        body: String,
    },

    /// HTTP 200 with an error code in the body
    #[error("{channel} rejected message (code {code}): {message}")]
    Rejected {
        channel: &'static str,
        code: i64,
        message: String,
    },
}
