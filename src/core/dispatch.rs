// Notification dispatch - forwards newly derived alerts to the external
// notification backend, at most once per alert occurrence.
//
// Critical alerts go out immediately. Warnings sit in a pending queue for a
// short window first; if the condition clears or the alert is dismissed
// before the window elapses, the queued send is cancelled. Notifying on an
// already-resolved alert is a correctness bug, not a nuisance.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::alerts::model::{Alert, AlertId, AlertType, Severity};
use crate::core::model::ItemId;

/// Wire shape accepted by the notification backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub chemical_id: ItemId,
    pub timestamp: DateTime<Utc>,
    pub recipients: Vec<String>,
}

impl NotificationPayload {
    pub fn from_alert(alert: &Alert, recipients: &[String]) -> Self {
        Self {
            alert_type: alert.alert_type,
            severity: alert.severity,
            message: alert.message.clone(),
            chemical_id: alert.item_id.clone(),
            timestamp: alert.created_at,
            recipients: recipients.to_vec(),
        }
    }
}

/// Failure reported by the notification backend.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("notification backend rejected the request: {0}")]
    Rejected(String),
    #[error("notification backend unreachable: {0}")]
    Unreachable(String),
    #[error("failed to encode notification payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Delivery endpoint for notifications. Injected by the embedding
/// application; typically an HTTP client posting to the backend.
pub trait NotificationSink: Send + Sync {
    fn send(&self, payload: &NotificationPayload) -> Result<(), SinkError>;
}

/// Dispatch tunables - persisted in settings.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Hold-down window for warning alerts in seconds (default: 5)
    #[serde(default = "default_warning_delay")]
    pub warning_delay_seconds: u64,
    /// Roles the backend should fan notifications out to
    #[serde(default = "default_recipients")]
    pub recipients: Vec<String>,
}

fn default_warning_delay() -> u64 {
    5
}

fn default_recipients() -> Vec<String> {
    vec!["admin".to_string(), "product".to_string()]
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            warning_delay_seconds: default_warning_delay(),
            recipients: default_recipients(),
        }
    }
}

impl DispatchConfig {
    pub fn warning_delay(&self) -> Duration {
        Duration::from_secs(self.warning_delay_seconds)
    }
}

struct PendingWarning {
    due: Instant,
    alert: Alert,
}

/// Dispatch state for one client session.
///
/// `sent` is the delivery record: an id lands there only after the sink call
/// succeeds, so a failed critical send is retried on the next recompute
/// cycle. Warnings get one attempt per hold-down window; the pending map is
/// keyed by alert id so dismissal cancels in O(1).
pub struct Dispatcher {
    config: DispatchConfig,
    sink: Arc<dyn NotificationSink>,
    sent: HashSet<AlertId>,
    pending: HashMap<AlertId, PendingWarning>,
    previous: HashSet<AlertId>,
    current: HashSet<AlertId>,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            sink,
            sent: HashSet::new(),
            pending: HashMap::new(),
            previous: HashSet::new(),
            current: HashSet::new(),
        }
    }

    /// Feed the alert set from a recompute cycle. Sends new criticals right
    /// away, queues new warnings, and cancels queued warnings whose
    /// condition no longer holds.
    pub fn on_alerts_changed(&mut self, alerts: &[Alert], now: Instant) {
        self.current = alerts.iter().map(|a| a.id.clone()).collect();

        // Condition cleared before the window elapsed: drop the queued send.
        let current = &self.current;
        self.pending.retain(|id, _| current.contains(id));

        for alert in alerts {
            match alert.severity {
                Severity::Critical => {
                    // Gated on the delivery record alone, so a failed send
                    // stays eligible next cycle.
                    if !self.sent.contains(&alert.id) {
                        self.send_now(alert);
                    }
                }
                Severity::Warning => {
                    let is_new = !self.previous.contains(&alert.id)
                        && !self.pending.contains_key(&alert.id)
                        && !self.sent.contains(&alert.id);
                    if is_new {
                        self.pending.insert(
                            alert.id.clone(),
                            PendingWarning {
                                due: now + self.config.warning_delay(),
                                alert: alert.clone(),
                            },
                        );
                    }
                }
            }
        }

        self.previous = self.current.clone();
    }

    /// Fire queued warnings whose hold-down window has elapsed. Membership
    /// is re-checked at fire time in case the condition cleared between the
    /// last recompute and this tick.
    pub fn tick(&mut self, now: Instant) {
        let due: Vec<AlertId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in due {
            if let Some(pending) = self.pending.remove(&id) {
                if self.current.contains(&id) {
                    self.send_now(&pending.alert);
                }
            }
        }
    }

    /// Cancel any queued dispatch for a dismissed alert.
    pub fn cancel(&mut self, alert_id: &str) {
        self.pending.remove(alert_id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn was_delivered(&self, alert_id: &str) -> bool {
        self.sent.contains(alert_id)
    }

    fn send_now(&mut self, alert: &Alert) {
        let payload = NotificationPayload::from_alert(alert, &self.config.recipients);
        match self.sink.send(&payload) {
            Ok(()) => {
                info!("notification sent for {}", alert.id);
                self.sent.insert(alert.id.clone());
            }
            Err(e) => {
                // No automatic retry here; criticals become eligible again
                // on the next recompute because the record was not written.
                warn!("failed to send notification for {}: {}", alert.id, e);
            }
        }
    }
}
