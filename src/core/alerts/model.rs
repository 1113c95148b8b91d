// Alert model types for derived stock alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::{ItemId, UnitName};

/// Deterministic alert identifier, e.g. `low_stock:c1`.
pub type AlertId = String;

/// Kind of stock condition an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowStock => "low_stock",
            Self::OutOfStock => "out_of_stock",
        }
    }

    /// Stable id for this alert type on a given item. Re-deriving the same
    /// condition always yields the same id, so recomputation is idempotent.
    pub fn id_for(&self, item_id: &str) -> AlertId {
        format!("{}:{}", self.as_str(), item_id)
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::LowStock => Severity::Warning,
            Self::OutOfStock => Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

/// A derived, non-authoritative signal computed from inventory state.
///
/// Alerts are synthesized on every recompute and are never persisted by the
/// engine; one exists exactly as long as its triggering condition holds and
/// it has not been dismissed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub item_id: ItemId,
    /// Quantity observed when the alert was derived. Part of the dismissal
    /// fingerprint: a dismissal only holds while this value is unchanged.
    pub quantity: f64,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            item_id: self.item_id.clone(),
            alert_type: self.alert_type,
            quantity: self.quantity,
        }
    }
}

/// The condition a dismissal was recorded against. While an item re-derives
/// an alert with the same fingerprint, the dismissal stays in force; once
/// the quantity moves (restock, further draw-down) the alert re-arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub item_id: ItemId,
    pub alert_type: AlertType,
    pub quantity: f64,
}

/// Tunables for alert derivation - persisted in settings.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// Threshold applied when an item carries none of its own (default: 10)
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    /// Countable units that never raise low-stock warnings. Out-of-stock
    /// still fires for them.
    #[serde(default = "default_exempt_units")]
    pub exempt_units: Vec<UnitName>,
}

fn default_threshold() -> f64 {
    10.0
}

fn default_exempt_units() -> Vec<UnitName> {
    vec!["pieces".to_string(), "bottles".to_string()]
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            exempt_units: default_exempt_units(),
        }
    }
}

impl AlertPolicy {
    /// Effective low-stock threshold for an item. Negative or missing
    /// per-item thresholds are invalid and replaced by the default.
    pub fn threshold_for(&self, alert_threshold: Option<f64>) -> f64 {
        match alert_threshold {
            Some(t) if t >= 0.0 => t,
            _ => self.default_threshold,
        }
    }

    pub fn is_exempt_unit(&self, unit: &str) -> bool {
        self.exempt_units.iter().any(|u| u == unit)
    }
}
