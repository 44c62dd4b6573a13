//! JSON text webhook channel (WeCom group-robot style).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::message::Message;
use crate::NotifyChannel;

const CHANNEL: &str = "webhook";

/// Posts `{"msgtype": "text", "text": {"content": ...}}` to a webhook URL.
pub struct WebhookChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a webhook channel with a specific URL.
    pub fn new(webhook_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ChannelError> {
        Ok(Self {
            webhook_url: webhook_url.into(),
            client: super::http_client(timeout_secs)?,
        })
    }

    fn format_payload(message: &Message) -> WebhookPayload<'_> {
        WebhookPayload {
            msgtype: "text",
            text: WebhookText {
                content: &message.body,
            },
        }
    }
}

#[async_trait]
impl NotifyChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    fn enabled(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        debug!(channel = CHANNEL, bytes = message.body.len(), "Sending message");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&Self::format_payload(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(channel = CHANNEL, status = %status, body = %body, "Webhook request failed");
            return Err(ChannelError::Status {
                channel: CHANNEL,
                status: status.as_u16(),
                body,
            });
        }

        let ack: WebhookAck = response.json().await?;
        if ack.errcode == 0 {
            debug!(channel = CHANNEL, "Message acknowledged");
            Ok(())
        } else {
            Err(ChannelError::Rejected {
                channel: CHANNEL,
                code: ack.errcode,
                message: ack.errmsg.unwrap_or_default(),
            })
        }
    }
}

// =============================================================================
// Webhook wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    msgtype: &'static str,
    text: WebhookText<'a>,
}

#[derive(Debug, Serialize)]
struct WebhookText<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WebhookAck {
    // Missing code counts as failure.
    #[serde(default = "missing_code")]
    errcode: i64,
    #[serde(default)]
    errmsg: Option<String>,
}

const fn missing_code() -> i64 {
    -1
}
