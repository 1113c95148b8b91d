// Alert engine - derives stock alerts from snapshots and manages dismissals.

use std::collections::HashMap;

use chrono::Utc;

use super::model::{Alert, AlertId, AlertPolicy, AlertType, Fingerprint};
use crate::core::model::InventoryItem;

/// Format a quantity the way the inventory UI shows it: whole numbers
/// without a trailing fraction, everything else as-is.
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

fn low_stock_message(item: &InventoryItem, quantity: f64, threshold: f64) -> String {
    format!(
        "Low stock alert: {} has only {} {} remaining (threshold: {} {})",
        item.name,
        format_quantity(quantity),
        item.unit,
        format_quantity(threshold),
        item.unit
    )
}

fn out_of_stock_message(item: &InventoryItem) -> String {
    format!("Out of stock: {} is completely depleted", item.name)
}

/// Derive the alert set for a snapshot. Pure: same snapshot and policy in,
/// same alerts out (modulo `created_at` timestamps), output order follows
/// input order. At most one alert per item:
///
/// - quantity <= 0 (or missing): critical out-of-stock
/// - 0 < quantity < threshold, unit not exempt: warning low-stock
/// - quantity == threshold: no alert (strict less-than)
pub fn derive_alerts(snapshot: &[InventoryItem], policy: &AlertPolicy) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let now = Utc::now();

    for item in snapshot {
        let quantity = item.quantity_or_zero();
        let threshold = policy.threshold_for(item.alert_threshold);

        if quantity <= 0.0 {
            alerts.push(Alert {
                id: AlertType::OutOfStock.id_for(&item.id),
                alert_type: AlertType::OutOfStock,
                severity: AlertType::OutOfStock.severity(),
                message: out_of_stock_message(item),
                item_id: item.id.clone(),
                quantity,
                created_at: now,
            });
        } else if quantity < threshold && !policy.is_exempt_unit(&item.unit) {
            alerts.push(Alert {
                id: AlertType::LowStock.id_for(&item.id),
                alert_type: AlertType::LowStock,
                severity: AlertType::LowStock.severity(),
                message: low_stock_message(item, quantity, threshold),
                item_id: item.id.clone(),
                quantity,
                created_at: now,
            });
        }
    }

    alerts
}

/// Stateful wrapper that layers dismissal tracking over `derive_alerts`.
///
/// A dismissal is keyed by alert id and pinned to the condition fingerprint
/// at dismissal time. The alert stays suppressed while every recompute
/// re-derives the same fingerprint; as soon as the condition clears or the
/// quantity changes, the dismissal is dropped and the alert may fire again.
pub struct AlertEngine {
    policy: AlertPolicy,
    dismissed: HashMap<AlertId, Fingerprint>,
}

impl AlertEngine {
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            dismissed: HashMap::new(),
        }
    }

    /// Swap in a new policy (hot-reload friendly)
    pub fn update_policy(&mut self, policy: AlertPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Recompute the visible alert set for a snapshot. Never fails;
    /// malformed items degrade to out-of-stock rather than being skipped.
    pub fn recompute(&mut self, snapshot: &[InventoryItem]) -> Vec<Alert> {
        let mut alerts = derive_alerts(snapshot, &self.policy);

        // Dismissals survive only while the exact condition they were
        // recorded against is still being derived.
        let live: HashMap<AlertId, Fingerprint> = alerts
            .iter()
            .map(|a| (a.id.clone(), a.fingerprint()))
            .collect();
        self.dismissed
            .retain(|id, recorded| live.get(id) == Some(recorded));

        alerts.retain(|a| !self.dismissed.contains_key(&a.id));
        alerts
    }

    /// Record a user dismissal for an alert from the last recompute.
    pub fn dismiss(&mut self, alert: &Alert) {
        self.dismissed.insert(alert.id.clone(), alert.fingerprint());
    }

    pub fn is_dismissed(&self, alert_id: &str) -> bool {
        self.dismissed.contains_key(alert_id)
    }
}
