//! Digest policy and delivery.

use chrono::NaiveDate;
use notify::{ChannelError, Notifier, NotifyConfig};
use std::fmt;

use super::generator::DigestGenerator;
use super::window::DigestWindow;
use crate::config::DigestSettings;
use crate::storage::PaperStore;

/// What the digest step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    /// Notifications are turned off or have no credential.
    Disabled,
    /// Nothing matched and empty digests are not pushed.
    Skipped,
    /// A digest was acknowledged by the channel.
    Sent {
        /// Papers in the digest (0 for an empty-update message).
        papers: usize,
    },
    /// Building or delivering the digest failed.
    Failed {
        /// Error description.
        reason: String,
    },
}

impl fmt::Display for DigestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Skipped => write!(f, "skipped (no new papers)"),
            Self::Sent { papers } => write!(f, "sent ({papers} papers)"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Builds the digest for a run date and pushes it through the notifier.
pub struct DigestSender {
    notifier: Notifier,
    settings: DigestSettings,
    push_empty_updates: bool,
}

impl DigestSender {
    /// Create a sender around an existing notifier.
    #[must_use]
    pub fn new(notifier: Notifier, settings: DigestSettings, push_empty_updates: bool) -> Self {
        Self {
            notifier,
            settings,
            push_empty_updates,
        }
    }

    /// Create a sender from the notification config.
    pub fn from_config(
        notify: &NotifyConfig,
        settings: DigestSettings,
    ) -> Result<Self, ChannelError> {
        let notifier = Notifier::from_config(notify)?;
        Ok(Self::new(notifier, settings, notify.push_empty_updates))
    }

    /// Send the digest of papers dated the day before `run_date`.
    ///
    /// Never fails: every error ends up in `DigestOutcome::Failed`.
    pub async fn send_daily(&self, store: &PaperStore, run_date: NaiveDate) -> DigestOutcome {
        if !self.notifier.is_enabled() {
            tracing::info!("Digest delivery disabled");
            return DigestOutcome::Disabled;
        }

        let window = DigestWindow::yesterday(store, run_date);
        let papers = window.total();

        if papers == 0 && !self.push_empty_updates {
            tracing::info!(date = %window.date(), "No new papers, skipping digest");
            return DigestOutcome::Skipped;
        }

        if papers == 0 {
            tracing::info!(date = %window.date(), "No new papers, pushing empty digest");
        } else {
            tracing::info!(date = %window.date(), papers, "Pushing digest");
        }

        let message = DigestGenerator::generate_text(&window, &self.settings);
        match self.notifier.send(&message).await {
            Ok(()) => {
                tracing::info!(
                    channel = self.notifier.channel_name().unwrap_or("none"),
                    papers,
                    "Digest delivered"
                );
                DigestOutcome::Sent { papers }
            }
            Err(e) => {
                tracing::error!(error = %e, "Digest delivery failed");
                DigestOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Send the fixed test message.
    pub async fn send_test(&self) -> Result<(), ChannelError> {
        let message = DigestGenerator::test_message(&self.settings);
        self.notifier.send(&message).await
    }
}
