/// Fire-and-forget alert channel the engine reports anomalies through.
///
/// Root-count anomalies, discovered cycles, and resolution outcomes are
/// published as [`Alert`] values. The engine never blocks on the channel and
/// never requires acknowledgment; a sink that drops everything is a valid
/// implementation. Alerts carry no identity beyond their content — a
/// retraction matches the alert it was published as.
use std::sync::Mutex;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// The category of an engine alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The finalized graph has zero or more than one root.
    RootCountAnomaly,
    /// A traversal discovered a cycle in the taxonomy.
    CycleDetected,
    /// A resolver pass removed an edge and no cycles remain.
    ResolutionSucceeded,
    /// A resolver pass removed an edge but cycles remain.
    ResolutionFailed,
}

/// An immutable notification published to the alert channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Category of the condition being reported.
    pub kind: AlertKind,
    /// Human-readable description, formatted through the view context.
    pub message: String,
}

impl Alert {
    /// Creates an alert of the given kind.
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AlertChannel
// ---------------------------------------------------------------------------

/// Destination for engine alerts.
///
/// Both operations are fire-and-forget; implementations must not block the
/// caller. `retract` withdraws a previously published alert (matched by
/// content) after its condition has been repaired.
pub trait AlertChannel: Send + Sync {
    /// Delivers `alert` to the channel.
    fn publish(&self, alert: &Alert);

    /// Withdraws a previously published alert.
    fn retract(&self, alert: &Alert);
}

/// Channel that forwards alerts to the `tracing` subscriber.
///
/// Cycle and anomaly alerts log at warn level, resolution successes at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertChannel;

impl AlertChannel for TracingAlertChannel {
    fn publish(&self, alert: &Alert) {
        match alert.kind {
            AlertKind::RootCountAnomaly | AlertKind::CycleDetected | AlertKind::ResolutionFailed => {
                tracing::warn!(kind = ?alert.kind, message = %alert.message, "taxonomy alert");
            }
            AlertKind::ResolutionSucceeded => {
                tracing::info!(kind = ?alert.kind, message = %alert.message, "taxonomy alert");
            }
        }
    }

    fn retract(&self, alert: &Alert) {
        tracing::info!(kind = ?alert.kind, message = %alert.message, "taxonomy alert retracted");
    }
}

/// Test and tooling channel that records everything it receives.
#[derive(Debug, Default)]
pub struct CollectingChannel {
    published: Mutex<Vec<Alert>>,
    retracted: Mutex<Vec<Alert>>,
}

impl CollectingChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every alert published so far, in order.
    pub fn published(&self) -> Vec<Alert> {
        self.published.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Every alert retracted so far, in order.
    pub fn retracted(&self) -> Vec<Alert> {
        self.retracted.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Published alerts that have not been retracted, in publish order.
    pub fn active(&self) -> Vec<Alert> {
        let retracted = self.retracted();
        let mut remaining = retracted;
        self.published()
            .into_iter()
            .filter(|alert| {
                if let Some(pos) = remaining.iter().position(|r| r == alert) {
                    remaining.remove(pos);
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Published alerts of one kind.
    pub fn published_of(&self, kind: AlertKind) -> Vec<Alert> {
        self.published()
            .into_iter()
            .filter(|a| a.kind == kind)
            .collect()
    }
}

impl AlertChannel for CollectingChannel {
    fn publish(&self, alert: &Alert) {
        if let Ok(mut published) = self.published.lock() {
            published.push(alert.clone());
        }
    }

    fn retract(&self, alert: &Alert) {
        if let Ok(mut retracted) = self.retracted.lock() {
            retracted.push(alert.clone());
        }
    }
}
