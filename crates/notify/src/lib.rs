//! Digest delivery for arxiv-daily.
//!
//! This crate sends plain-text digests to a messaging endpoint. Delivery is
//! best effort: callers get a `Result` back and decide how loudly to fail.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{Message, NotifyConfig, Notifier};
//!
//! # async fn run() -> Result<(), notify::ChannelError> {
//! let config = NotifyConfig {
//!     enabled: true,
//!     webhook_url: Some("https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=...".to_string()),
//!     ..Default::default()
//! };
//!
//! let notifier = Notifier::from_config(&config)?;
//! notifier.send(&Message::new("arXiv Daily", "3 new papers")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`NotifyConfig`] is deserialized from the `notify` block of the job
//! config. Credentials can be overridden from the environment:
//!
//! - `NOTIFY_WEBHOOK_URL`: JSON webhook URL
//! - `SERVERCHAN_KEY`: ServerChan send key
//! - `NOTIFY_DISABLED`: Set to "true" to disable all notifications
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for delivery channels
//! - [`WebhookChannel`] posts a JSON text envelope and checks `errcode`
//! - [`ServerChanChannel`] posts a form to the relay and checks `code`
//! - [`Notifier`] holds the one channel selected by configuration

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod config;
pub mod error;
pub mod message;

pub use channels::serverchan::ServerChanChannel;
pub use channels::webhook::WebhookChannel;
pub use channels::NotifyChannel;
pub use config::{DeliveryMethod, NotifyConfig};
pub use error::ChannelError;
pub use message::Message;

use std::sync::Arc;
use tracing::{debug, info};

/// Digest dispatcher bound to the configured channel.
pub struct Notifier {
    channel: Option<Arc<dyn NotifyChannel>>,
}

impl Notifier {
    /// Build a notifier from configuration.
    ///
    /// A disabled config yields a disabled notifier. An enabled config with
    /// an unknown method, or without the credential its method needs, is
    /// an error.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, ChannelError> {
        if !config.is_enabled() {
            info!("Notifications disabled or not configured");
            return Ok(Self::disabled());
        }

        let channel: Arc<dyn NotifyChannel> = match config.method.parse::<DeliveryMethod>()? {
            DeliveryMethod::Webhook => {
                let url = non_blank(config.webhook_url.as_deref())
                    .ok_or_else(|| ChannelError::NotConfigured("webhook_url".to_string()))?;
                Arc::new(WebhookChannel::new(url, config.timeout_secs)?)
            }
            DeliveryMethod::ServerChan => {
                let key = non_blank(config.serverchan_key.as_deref())
                    .ok_or_else(|| ChannelError::NotConfigured("serverchan_key".to_string()))?;
                Arc::new(ServerChanChannel::new(key, config.timeout_secs)?)
            }
        };

        info!(channel = channel.name(), "Notification channel initialized");
        Ok(Self {
            channel: Some(channel),
        })
    }

    /// Create a notifier with a specific channel.
    #[must_use]
    pub fn with_channel(channel: Arc<dyn NotifyChannel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// Create a disabled notifier.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { channel: None }
    }

    /// Check if a usable channel is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.channel.as_ref().is_some_and(|c| c.enabled())
    }

    /// Name of the active channel, if any.
    #[must_use]
    pub fn channel_name(&self) -> Option<&'static str> {
        self.channel.as_ref().map(|c| c.name())
    }

    /// Send a message and wait for the acknowledgement.
    pub async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        let Some(channel) = self.channel.as_ref().filter(|c| c.enabled()) else {
            debug!("No channel configured, skipping message");
            return Err(ChannelError::NotConfigured("no delivery channel".to_string()));
        };

        channel.send(message).await?;
        debug!(channel = channel.name(), "Message delivered");
        Ok(())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::disabled()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
