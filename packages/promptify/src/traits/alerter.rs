//! User-visible alert sink.
//!
//! Alerts are fire-and-forget: the controller never waits on delivery and
//! never learns whether anyone saw them.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Alert tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Destructive,
}

/// A short notification for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
}

impl Alert {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: AlertSeverity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: AlertSeverity::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == AlertSeverity::Destructive
    }
}

/// Receives alerts.
pub trait Alerter: Send + Sync {
    fn notify(&self, alert: Alert);
}

/// Writes alerts to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlerter;

impl Alerter for TracingAlerter {
    fn notify(&self, alert: Alert) {
        match alert.severity {
            AlertSeverity::Info => info!(title = %alert.title, "{}", alert.description),
            AlertSeverity::Destructive => warn!(title = %alert.title, "{}", alert.description),
        }
    }
}

/// Forwards alerts into a channel, for front ends that render them.
impl Alerter for tokio::sync::mpsc::UnboundedSender<Alert> {
    fn notify(&self, alert: Alert) {
        // Receiver gone means nobody is listening any more
        let _ = self.send(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_alerter_delivers() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.notify(Alert::destructive("Oops", "details"));

        let alert = rx.try_recv().unwrap();
        assert!(alert.is_destructive());
        assert_eq!(alert.title, "Oops");
    }

    #[test]
    fn test_channel_alerter_ignores_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Alert>();
        drop(rx);
        tx.notify(Alert::info("Still fine", ""));
    }
}
