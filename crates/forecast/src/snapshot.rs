use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One toner exchange as seen by the forecaster.
///
/// Read-only input; the forecaster never mutates the exchange log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeEvent {
    /// Grouping key; matched against [`StockItem::name`] by exact equality.
    pub toner_name: String,
    pub equipment_serial_number: String,
    pub exchange_date: DateTime<Utc>,
    /// Meter-count delta since the previous exchange on the same equipment.
    pub performance_difference: i64,
}

/// Current on-hand quantity of one toner type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub name: String,
    pub quantity: u64,
}

/// Source of exchange history (all equipment, or one device by serial number).
pub trait ExchangeLogReader: Send + Sync {
    fn exchanges(&self, equipment_serial_number: Option<&str>) -> Vec<ExchangeEvent>;
}

/// Source of current stock levels keyed by toner name.
pub trait InventoryReader: Send + Sync {
    fn stock(&self) -> Vec<StockItem>;
}
