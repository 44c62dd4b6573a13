//! Notification channel implementations.

pub mod serverchan;
pub mod webhook;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::Message;

/// Trait for notification channels (JSON webhook, ServerChan, etc.).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Deliver a message through this channel.
    ///
    /// Success means the remote side acknowledged the message with its
    /// in-body success code, not just an HTTP 200.
    async fn send(&self, message: &Message) -> Result<(), ChannelError>;
}

/// Build the HTTP client with a bounded request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ChannelError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}
