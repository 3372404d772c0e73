// ── Mutation outcome notifications ──
//
// One notification per mutation, fanned out over a broadcast channel.
// Senders never wait: a full or receiver-less channel just drops.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

const NOTIFY_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn is_failure(&self) -> bool {
        self.level == NotificationLevel::Failure
    }
}

/// Cheaply cloneable handle to the notification channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Arc<Notification>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFY_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.tx.subscribe()
    }

    pub fn notify_success(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Success, message.into());
    }

    pub fn notify_failure(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Failure, message.into());
    }

    fn send(&self, level: NotificationLevel, message: String) {
        debug!(%level, %message, "notification");
        let _ = self.tx.send(Arc::new(Notification {
            level,
            message,
            at: Utc::now(),
        }));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.notify_success("Domain added");
        notifier.notify_failure("Scan failed");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, NotificationLevel::Success);
        assert_eq!(first.message, "Domain added");
        assert!(rx.recv().await.unwrap().is_failure());
    }

    #[test]
    fn sending_without_receivers_does_not_block() {
        let notifier = Notifier::new();
        for i in 0..(NOTIFY_CHANNEL_SIZE * 2) {
            notifier.notify_success(format!("n{i}"));
        }
    }
}
