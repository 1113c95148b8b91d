// Session coordinator - wires role resolution, alert derivation and
// notification dispatch for one client session.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{info, warn};
use thiserror::Error;
use tokio::sync::watch;

use super::alerts::engine::AlertEngine;
use super::alerts::model::Alert;
use super::config::Settings;
use super::dispatch::{Dispatcher, NotificationSink};
use super::model::InventoryItem;
use super::rbac::{resolve, Capability, Role};

/// Failure fetching an inventory snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("inventory backend unreachable: {0}")]
    Unreachable(String),
    #[error("malformed inventory payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Pull-model supplier of inventory snapshots, typically an HTTP client
/// reading the backend's chemical table.
pub trait InventorySource: Send + Sync {
    fn fetch(&self) -> Result<Vec<InventoryItem>, SourceError>;
}

/// One user's engine instance: resolved role, alert state and dispatch
/// state. Construct once at session start with the role already resolved;
/// nothing here re-derives the role afterwards.
///
/// The session does not enforce capabilities - it answers queries so the UI
/// can gate buttons and calls, and the backend remains the authority.
pub struct Session {
    role: Role,
    capabilities: HashSet<Capability>,
    engine: AlertEngine,
    dispatcher: Dispatcher,
    alerts: Vec<Alert>,
}

impl Session {
    pub fn new(role: Role, settings: &Settings, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            role,
            capabilities: resolve(role),
            engine: AlertEngine::new(settings.alert_policy.clone()),
            dispatcher: Dispatcher::new(settings.dispatch.clone(), sink),
            alerts: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn capabilities(&self) -> &HashSet<Capability> {
        &self.capabilities
    }

    /// Alerts from the most recent tick.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Process one inventory snapshot: recompute the alert set, feed the
    /// dispatcher, and fire any due delayed sends.
    pub fn tick(&mut self, snapshot: &[InventoryItem], now: Instant) -> Vec<Alert> {
        let alerts = self.engine.recompute(snapshot);
        self.dispatcher.on_alerts_changed(&alerts, now);
        self.dispatcher.tick(now);
        self.alerts = alerts.clone();
        alerts
    }

    /// Dismiss an alert by id. Suppresses it until its condition changes and
    /// cancels any queued notification for it.
    pub fn dismiss(&mut self, alert_id: &str) {
        if let Some(alert) = self.alerts.iter().find(|a| a.id == alert_id).cloned() {
            self.engine.dismiss(&alert);
            self.dispatcher.cancel(alert_id);
            self.alerts.retain(|a| a.id != alert_id);
        }
    }
}

/// Poll the inventory source on an interval, feeding each snapshot through
/// the session. Runs until the stop channel flips; fetch errors are logged
/// and the loop keeps going.
pub async fn run_poll_loop(
    session: Arc<Mutex<Session>>,
    source: Arc<dyn InventorySource>,
    poll_interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    info!("inventory poll loop started");
    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match source.fetch() {
                    Ok(snapshot) => {
                        let mut session = session.lock().unwrap();
                        session.tick(&snapshot, Instant::now());
                    }
                    Err(e) => {
                        warn!("inventory poll failed: {}", e);
                    }
                }
            }
            changed = stop.changed() => {
                // A dropped sender counts as a stop signal.
                if changed.is_err() || *stop.borrow() {
                    info!("inventory poll loop stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::alerts::model::Severity;
    use crate::core::dispatch::{NotificationPayload, SinkError};

    struct RecordingSink {
        sent: Mutex<Vec<NotificationPayload>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl NotificationSink for RecordingSink {
        fn send(&self, payload: &NotificationPayload) -> Result<(), SinkError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct StubSource {
        snapshot: Mutex<Vec<InventoryItem>>,
    }

    impl InventorySource for StubSource {
        fn fetch(&self) -> Result<Vec<InventoryItem>, SourceError> {
            Ok(self.snapshot.lock().unwrap().clone())
        }
    }

    fn item(id: &str, quantity: f64, unit: &str) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Chemical {}", id),
            quantity: Some(quantity),
            unit: unit.to_string(),
            alert_threshold: None,
        }
    }

    #[test]
    fn test_session_gates_by_role() {
        let sink = RecordingSink::new();
        let session = Session::new(Role::LabStaff, &Settings::default(), sink);
        assert!(session.can(Capability::CreateChemical));
        assert!(!session.can(Capability::DeleteChemical));
        assert_eq!(session.role(), Role::LabStaff);
    }

    #[test]
    fn test_tick_derives_and_dispatches() {
        let sink = RecordingSink::new();
        let mut session = Session::new(Role::Admin, &Settings::default(), sink.clone());
        let now = Instant::now();

        let alerts = session.tick(&[item("c1", 0.0, "L"), item("c2", 3.0, "g")], now);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, Severity::Critical);

        // Only the critical goes out right away
        assert_eq!(sink.sent_count(), 1);

        // Next tick past the warning window flushes the held warning
        session.tick(
            &[item("c1", 0.0, "L"), item("c2", 3.0, "g")],
            now + Duration::from_secs(6),
        );
        assert_eq!(sink.sent_count(), 2);
    }

    #[test]
    fn test_dismiss_suppresses_and_cancels() {
        let sink = RecordingSink::new();
        let mut session = Session::new(Role::Admin, &Settings::default(), sink.clone());
        let now = Instant::now();

        let alerts = session.tick(&[item("c2", 3.0, "g")], now);
        assert_eq!(alerts.len(), 1);
        session.dismiss(&alerts[0].id);
        assert!(session.alerts().is_empty());

        // The dismissed warning never reaches the sink and stays hidden
        let alerts = session.tick(&[item("c2", 3.0, "g")], now + Duration::from_secs(10));
        assert!(alerts.is_empty());
        assert_eq!(sink.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_loop_feeds_session() {
        let sink = RecordingSink::new();
        let session = Arc::new(Mutex::new(Session::new(
            Role::Admin,
            &Settings::default(),
            sink.clone(),
        )));
        let source = Arc::new(StubSource {
            snapshot: Mutex::new(vec![item("c1", 0.0, "L")]),
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_poll_loop(
            session.clone(),
            source,
            Duration::from_millis(10),
            stop_rx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        stop_tx.send(true).unwrap();
        handle.await.unwrap();

        // The out-of-stock alert was derived and delivered exactly once
        assert_eq!(sink.sent_count(), 1);
        assert_eq!(session.lock().unwrap().alerts().len(), 1);
    }
}
