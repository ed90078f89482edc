use std::collections::BTreeMap;
use std::sync::RwLock;

use printfleet_core::TonerId;
use printfleet_forecast::{InventoryReader, StockItem};
use printfleet_inventory::{TonerEvent, TonerSummary};

use super::Projection;

/// Current stock per toner (the stock table).
#[derive(Debug, Default)]
pub struct StockLevelsProjection {
    rows: RwLock<BTreeMap<TonerId, TonerSummary>>,
}

impl StockLevelsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, toner_id: &TonerId) -> Option<TonerSummary> {
        self.rows.read().ok()?.get(toner_id).cloned()
    }

    /// All active toners, in id order.
    pub fn list(&self) -> Vec<TonerSummary> {
        match self.rows.read() {
            Ok(rows) => rows.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    /// First active toner with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<TonerSummary> {
        self.rows.read().ok()?.values().find(|r| r.name == name).cloned()
    }
}

impl Projection<TonerEvent> for StockLevelsProjection {
    fn apply(&self, event: &TonerEvent) {
        let Ok(mut rows) = self.rows.write() else {
            return;
        };

        match event {
            TonerEvent::Registered(e) => {
                rows.insert(
                    e.toner_id,
                    TonerSummary {
                        id: e.toner_id,
                        name: e.name.clone(),
                        performance: e.performance,
                        quantity: e.quantity,
                    },
                );
            }
            TonerEvent::Updated(e) => {
                if let Some(row) = rows.get_mut(&e.toner_id) {
                    row.name = e.name.clone();
                    row.performance = e.performance;
                    row.quantity = e.quantity;
                }
            }
            TonerEvent::QuantityAdjusted(e) => {
                if let Some(row) = rows.get_mut(&e.toner_id) {
                    row.quantity = row.quantity.saturating_add_signed(e.delta);
                }
            }
            TonerEvent::Removed(e) => {
                rows.remove(&e.toner_id);
            }
        }
    }
}

impl InventoryReader for StockLevelsProjection {
    fn stock(&self) -> Vec<StockItem> {
        self.list()
            .into_iter()
            .map(|r| StockItem {
                name: r.name,
                quantity: r.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use printfleet_inventory::{QuantityAdjusted, TonerRegistered, TonerRemoved};

    fn registered(id: TonerId, name: &str, quantity: u64) -> TonerEvent {
        TonerEvent::Registered(TonerRegistered {
            toner_id: id,
            name: name.to_string(),
            performance: 2600,
            quantity,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn tracks_quantity_from_events() {
        let proj = StockLevelsProjection::new();
        let id = TonerId::new();

        proj.apply(&registered(id, "CF226A", 5));
        proj.apply(&TonerEvent::QuantityAdjusted(QuantityAdjusted {
            toner_id: id,
            delta: -2,
            occurred_at: Utc::now(),
        }));

        assert_eq!(proj.get(&id).unwrap().quantity, 3);
        assert_eq!(
            proj.stock(),
            vec![StockItem {
                name: "CF226A".to_string(),
                quantity: 3
            }]
        );
    }

    #[test]
    fn removed_toners_leave_the_stock_table() {
        let proj = StockLevelsProjection::new();
        let kept = TonerId::new();
        let removed = TonerId::new();

        proj.apply(&registered(kept, "CF226A", 1));
        proj.apply(&registered(removed, "TN-2420", 1));
        proj.apply(&TonerEvent::Removed(TonerRemoved {
            toner_id: removed,
            occurred_at: Utc::now(),
        }));

        assert_eq!(proj.list().len(), 1);
        assert!(proj.find_by_name("TN-2420").is_none());
        assert_eq!(proj.find_by_name("CF226A").unwrap().id, kept);
    }
}
