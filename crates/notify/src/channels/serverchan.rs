//! ServerChan forwarding relay channel.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::message::Message;
use crate::NotifyChannel;

const CHANNEL: &str = "serverchan";

/// Public ServerChan API base.
pub const DEFAULT_SERVERCHAN_BASE_URL: &str = "https://sctapi.ftqq.com";

/// Posts a form-encoded `title`/`desp` pair to `<base>/<sendkey>.send`.
pub struct ServerChanChannel {
    send_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ServerChanChannel {
    /// Create a channel against the public ServerChan API.
    pub fn new(send_key: impl Into<String>, timeout_secs: u64) -> Result<Self, ChannelError> {
        Self::with_base_url(send_key, DEFAULT_SERVERCHAN_BASE_URL, timeout_secs)
    }

    /// Create a channel against a custom relay base URL.
    pub fn with_base_url(
        send_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ChannelError> {
        Ok(Self {
            send_key: send_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: super::http_client(timeout_secs)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}.send", self.base_url, self.send_key)
    }
}

#[async_trait]
impl NotifyChannel for ServerChanChannel {
    fn name(&self) -> &'static str {
        CHANNEL
    }

    fn enabled(&self) -> bool {
        !self.send_key.trim().is_empty()
    }

    async fn send(&self, message: &Message) -> Result<(), ChannelError> {
        debug!(channel = CHANNEL, title = %message.title, "Sending message");

        let form = [("title", message.title.as_str()), ("desp", message.body.as_str())];
        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(channel = CHANNEL, status = %status, "Relay request failed");
            return Err(ChannelError::Status {
                channel: CHANNEL,
                status: status.as_u16(),
                body,
            });
        }

        let ack: RelayAck = response.json().await?;
        if ack.code == 0 {
            debug!(channel = CHANNEL, "Message acknowledged");
            Ok(())
        } else {
            Err(ChannelError::Rejected {
                channel: CHANNEL,
                code: ack.code,
                message: ack.message.unwrap_or_default(),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayAck {
    #[serde(default = "missing_code")]
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

const fn missing_code() -> i64 {
    -1
}
