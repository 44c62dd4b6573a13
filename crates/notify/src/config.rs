//! Notification settings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ChannelError;

/// Environment variable overriding the webhook URL.
pub const ENV_WEBHOOK_URL: &str = "NOTIFY_WEBHOOK_URL";

/// Environment variable overriding the ServerChan send key.
pub const ENV_SERVERCHAN_KEY: &str = "SERVERCHAN_KEY";

/// Environment variable to disable all notifications.
pub const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";

/// Default request timeout for delivery calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default delivery method name.
pub const DEFAULT_METHOD: &str = "webhook";

/// Settings for the digest notification block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Master switch.
    pub enabled: bool,
    /// Delivery method: `webhook` or `serverchan`.
    pub method: String,
    /// JSON webhook URL.
    pub webhook_url: Option<String>,
    /// ServerChan send key.
    pub serverchan_key: Option<String>,
    /// Send a "no updates" digest when nothing matched.
    pub push_empty_updates: bool,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            method: DEFAULT_METHOD.to_string(),
            webhook_url: None,
            serverchan_key: None,
            push_empty_updates: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NotifyConfig {
    /// Apply environment overrides for credentials and the kill switch.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_WEBHOOK_URL) {
            self.webhook_url = Some(url);
        }
        if let Some(key) = non_empty_env(ENV_SERVERCHAN_KEY) {
            self.serverchan_key = Some(key);
        }
        let disabled = std::env::var(ENV_NOTIFY_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        if disabled {
            self.enabled = false;
        }
        self
    }

    /// Enabled and at least one credential present.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
            && (has_value(self.webhook_url.as_ref()) || has_value(self.serverchan_key.as_ref()))
    }
}

/// Supported delivery methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    /// Generic JSON text webhook.
    Webhook,
    /// ServerChan forwarding relay.
    ServerChan,
}

impl FromStr for DeliveryMethod {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webhook" => Ok(Self::Webhook),
            "serverchan" => Ok(Self::ServerChan),
            other => Err(ChannelError::UnsupportedMethod(other.to_string())),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn has_value(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_methods() {
        assert_eq!("webhook".parse::<DeliveryMethod>().unwrap(), DeliveryMethod::Webhook);
        assert_eq!(
            "ServerChan".parse::<DeliveryMethod>().unwrap(),
            DeliveryMethod::ServerChan
        );
        assert!(matches!(
            "telegram".parse::<DeliveryMethod>(),
            Err(ChannelError::UnsupportedMethod(m)) if m == "telegram"
        ));
    }

    #[test]
    fn test_is_enabled_requires_credential() {
        let mut config = NotifyConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(!config.is_enabled());

        config.webhook_url = Some("  ".to_string());
        assert!(!config.is_enabled());

        config.serverchan_key = Some("SCT123".to_string());
        assert!(config.is_enabled());

        config.enabled = false;
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_defaults_from_partial_yaml_shape() {
        let config: NotifyConfig =
            serde_json::from_str(r#"{"enabled": true, "webhook_url": "https://hook"}"#).unwrap();
        assert_eq!(config.method, "webhook");
        assert!(!config.push_empty_updates);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_WEBHOOK_URL, "https://env-hook");
        std::env::set_var(ENV_NOTIFY_DISABLED, "1");
        let config = NotifyConfig {
            enabled: true,
            webhook_url: Some("https://file-hook".to_string()),
            ..Default::default()
        }
        .with_env_overrides();
        std::env::remove_var(ENV_WEBHOOK_URL);
        std::env::remove_var(ENV_NOTIFY_DISABLED);

        assert_eq!(config.webhook_url.as_deref(), Some("https://env-hook"));
        assert!(!config.enabled);
        assert!(config.serverchan_key.is_none());
    }
}
