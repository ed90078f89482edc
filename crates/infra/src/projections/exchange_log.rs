use std::sync::RwLock;

use printfleet_forecast::{ExchangeEvent, ExchangeLogReader};
use printfleet_maintenance::{EquipmentEvent, TonerExchange};

use super::Projection;

/// Append-only log of toner exchanges across all equipment.
///
/// Entries are never edited or removed; readers get cloned snapshots.
#[derive(Debug, Default)]
pub struct ExchangeLog {
    entries: RwLock<Vec<ExchangeEvent>>,
}

impl ExchangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, exchange: &TonerExchange) {
        if let Ok(mut entries) = self.entries.write() {
            entries.push(ExchangeEvent {
                toner_name: exchange.toner_name.clone(),
                equipment_serial_number: exchange.equipment_serial_number.clone(),
                exchange_date: exchange.exchanged_at,
                performance_difference: exchange.performance_difference,
            });
        }
    }
}

impl Projection<EquipmentEvent> for ExchangeLog {
    fn apply(&self, event: &EquipmentEvent) {
        if let EquipmentEvent::TonerExchanged(exchange) = event {
            self.append(exchange);
        }
    }
}

impl ExchangeLogReader for ExchangeLog {
    fn exchanges(&self, equipment_serial_number: Option<&str>) -> Vec<ExchangeEvent> {
        let Ok(entries) = self.entries.read() else {
            return vec![];
        };

        match equipment_serial_number {
            Some(serial) => entries
                .iter()
                .filter(|e| e.equipment_serial_number == serial)
                .cloned()
                .collect(),
            None => entries.clone(),
        }
    }
}
