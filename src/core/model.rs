use serde::{Deserialize, Serialize};

pub type ItemId = String;
pub type UnitName = String;

/// One chemical's current state as reported by the inventory backend.
///
/// Snapshots are read-only input: the engine never mutates them. Field names
/// match the backend JSON (`alert_threshold`). `quantity` and
/// `alert_threshold` are optional because the backend has historically sent
/// rows without them; the alert engine substitutes safe defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    pub unit: UnitName,
    #[serde(default)]
    pub alert_threshold: Option<f64>,
}

impl InventoryItem {
    /// Effective quantity on hand. A missing quantity reads as zero so the
    /// item surfaces as out of stock rather than silently disappearing.
    pub fn quantity_or_zero(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }
}
