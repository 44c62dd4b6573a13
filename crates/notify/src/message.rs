//! Outbound message type.

use serde::{Deserialize, Serialize};

/// A plain-text message handed to a delivery channel.
///
/// Channels that have no separate title field (the JSON webhook) only
/// send the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Short title, used by relays that show one.
    pub title: String,
    /// Message text.
    pub body: String,
}

impl Message {
    /// Create a new message.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}
