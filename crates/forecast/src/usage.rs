//! Exchange counts over the lookback window, grouped by toner or by device.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::snapshot::ExchangeEvent;
use crate::window::LookbackWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCount {
    pub key: String,
    pub exchanges: u64,
}

/// Toners issued per toner name.
pub fn usage_by_toner(
    lookback_months: i64,
    history: &[ExchangeEvent],
    now: DateTime<Utc>,
) -> Result<Vec<UsageCount>, ForecastError> {
    count_by(lookback_months, history, now, |e| e.toner_name.as_str())
}

/// Exchanges per equipment serial number (most frequently serviced devices).
pub fn usage_by_equipment(
    lookback_months: i64,
    history: &[ExchangeEvent],
    now: DateTime<Utc>,
) -> Result<Vec<UsageCount>, ForecastError> {
    count_by(lookback_months, history, now, |e| e.equipment_serial_number.as_str())
}

fn count_by<'a, F>(
    lookback_months: i64,
    history: &'a [ExchangeEvent],
    now: DateTime<Utc>,
    key: F,
) -> Result<Vec<UsageCount>, ForecastError>
where
    F: Fn(&'a ExchangeEvent) -> &'a str,
{
    let window = LookbackWindow::new(lookback_months)?;

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for event in history.iter().filter(|e| window.contains(&now, &e.exchange_date)) {
        *counts.entry(key(event)).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(key, exchanges)| UsageCount {
            key: key.to_string(),
            exchanges,
        })
        .collect())
}
