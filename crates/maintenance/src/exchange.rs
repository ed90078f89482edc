//! Toner exchange assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printfleet_core::EquipmentId;

/// A cartridge is premature when it printed less than this share of its
/// rated yield (95 %).
pub const PREMATURE_YIELD_PERCENT: i128 = 95;

/// One recorded toner exchange on a piece of equipment.
///
/// Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonerExchange {
    pub equipment_id: EquipmentId,
    pub equipment_serial_number: String,
    pub toner_name: String,
    /// Meter count at the moment of the exchange.
    pub meter_count: u64,
    /// Meter-count delta since the previous exchange on this equipment.
    pub performance_difference: i64,
    pub premature: bool,
    pub exchanged_at: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExchangeAssessment {
    pub performance_difference: i64,
    pub premature: bool,
}

/// Compare the pages printed since the previous exchange against the toner's
/// rated yield.
///
/// Without a previous exchange the delta is measured from meter count 0.
pub fn assess(previous_meter_count: Option<u64>, meter_count: u64, toner_performance: u64) -> ExchangeAssessment {
    let previous = i128::from(previous_meter_count.unwrap_or(0));
    let difference = i128::from(meter_count) - previous;

    let premature = difference * 100 < i128::from(toner_performance) * PREMATURE_YIELD_PERCENT;

    ExchangeAssessment {
        performance_difference: difference.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
        premature,
    }
}
