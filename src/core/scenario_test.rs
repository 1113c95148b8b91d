#[cfg(test)]
mod scenario_tests {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use crate::core::config::Settings;
    use crate::core::dispatch::{NotificationPayload, NotificationSink, SinkError};
    use crate::core::model::InventoryItem;
    use crate::core::rbac::{resolve, Capability, Role};
    use crate::core::session::Session;

    struct RecordingSink {
        sent: Mutex<Vec<NotificationPayload>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent_ids(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.alert_type.id_for(&p.chemical_id))
                .collect()
        }
    }

    impl NotificationSink for RecordingSink {
        fn send(&self, payload: &NotificationPayload) -> Result<(), SinkError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn item(id: &str, quantity: f64, unit: &str, threshold: Option<f64>) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Chemical {}", id),
            quantity: Some(quantity),
            unit: unit.to_string(),
            alert_threshold: threshold,
        }
    }

    // A product-team session watching a shrinking stock: the low-stock
    // warning appears, survives the hold-down window, gets delivered once,
    // then the item runs dry and escalates to an immediate critical.
    #[test]
    fn simulate_stock_drawdown_lifecycle() {
        let sink = RecordingSink::new();
        let mut session = Session::new(Role::Product, &Settings::default(), sink.clone());
        let start = Instant::now();

        assert!(session.can(Capability::ManageAlerts));

        // Healthy stock: nothing derived, nothing sent
        let alerts = session.tick(&[item("c1", 40.0, "g", Some(10.0))], start);
        assert!(alerts.is_empty());

        // Draw-down below threshold: warning derived, held back
        let alerts = session.tick(
            &[item("c1", 5.0, "g", Some(10.0))],
            start + Duration::from_secs(10),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "low_stock:c1");
        assert!(sink.sent_ids().is_empty());

        // Window elapsed on a later poll: warning delivered exactly once
        session.tick(
            &[item("c1", 5.0, "g", Some(10.0))],
            start + Duration::from_secs(16),
        );
        assert_eq!(sink.sent_ids(), vec!["low_stock:c1"]);

        // Depleted: low-stock alert is replaced by an immediate critical
        let alerts = session.tick(
            &[item("c1", 0.0, "g", Some(10.0))],
            start + Duration::from_secs(20),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "out_of_stock:c1");
        assert_eq!(sink.sent_ids(), vec!["low_stock:c1", "out_of_stock:c1"]);

        // Restock clears everything and nothing else is sent
        let alerts = session.tick(
            &[item("c1", 100.0, "g", Some(10.0))],
            start + Duration::from_secs(30),
        );
        assert!(alerts.is_empty());
        assert_eq!(sink.sent_ids().len(), 2);
    }

    // A transient dip that recovers inside the hold-down window must never
    // produce a notification.
    #[test]
    fn simulate_transient_dip_is_silent() {
        let sink = RecordingSink::new();
        let mut session = Session::new(Role::Admin, &Settings::default(), sink.clone());
        let start = Instant::now();

        let alerts = session.tick(&[item("c2", 4.0, "mL", None)], start);
        assert_eq!(alerts.len(), 1);

        // Recovered two seconds later, well inside the 5s window
        let alerts = session.tick(
            &[item("c2", 20.0, "mL", None)],
            start + Duration::from_secs(2),
        );
        assert!(alerts.is_empty());

        // Long after the window would have elapsed: still nothing sent
        session.tick(
            &[item("c2", 20.0, "mL", None)],
            start + Duration::from_secs(60),
        );
        assert!(sink.sent_ids().is_empty());
    }

    // Viewer sessions derive alerts like anyone else; capability gating is
    // the UI's concern and stays orthogonal to dispatch.
    #[test]
    fn simulate_read_only_session() {
        let sink = RecordingSink::new();
        let mut session = Session::new(Role::AllUsers, &Settings::default(), sink.clone());

        assert!(resolve(Role::AllUsers).is_empty());
        assert!(!session.can(Capability::EditChemical));

        let alerts = session.tick(&[item("c3", 0.0, "L", None)], Instant::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(sink.sent_ids(), vec!["out_of_stock:c3"]);
    }
}
