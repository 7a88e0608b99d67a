// ── Notification sink ──
//
// Transient success/error messages emitted after every mutation. The core
// only pushes; consumers decide how to show them and drop them once the
// display window has passed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

/// How long a notification stays on screen.
pub const DISPLAY_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at
            + chrono::Duration::from_std(DISPLAY_WINDOW).unwrap_or(chrono::Duration::zero())
    }

    /// `true` once the display window has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Receives transient messages from the engines.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs each notification at the level matching its kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.kind {
            NotificationKind::Success | NotificationKind::Info => {
                info!(kind = %n.kind, "{}", n.message);
            }
            NotificationKind::Warning => warn!("{}", n.message),
            NotificationKind::Error => error!("{}", n.message),
        }
    }
}

/// Fans notifications out to any number of subscribers.
///
/// Lagging subscribers lose the oldest messages; with nobody subscribed the
/// notification is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_display_window() {
        let n = Notification::success("Deleted 3 host groups");
        assert!(!n.is_expired_at(n.created_at + chrono::Duration::seconds(4)));
        assert!(n.is_expired_at(n.created_at + chrono::Duration::seconds(5)));
    }

    #[tokio::test]
    async fn broadcast_sink_delivers_to_subscribers() {
        let sink = BroadcastSink::default();
        let mut rx = sink.subscribe();
        sink.notify(Notification::error("boom"));
        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, NotificationKind::Error);
        assert_eq!(got.message, "boom");
    }
}
