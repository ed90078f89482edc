//! Toner need forecast and reorder calculation.
//!
//! Model:
//! - Count exchanges per toner name inside the lookback window (one exchange
//!   consumes one cartridge).
//! - Monthly usage is the count divided by the window length, rounded up.
//! - Need over the horizon is monthly usage times the calendar-month distance
//!   from now to the target date, never below zero.
//! - Shortfall is need minus current stock, never below zero.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use printfleet_core::months_between;

use crate::error::ForecastError;
use crate::snapshot::{ExchangeEvent, ExchangeLogReader, InventoryReader, StockItem};
use crate::window::LookbackWindow;

/// Forecast line for one toner type. Recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub toner_name: String,
    pub needed_toners: u64,
    pub quantity: u64,
    pub must_buy: u64,
}

/// Forecast against the system clock.
pub fn forecast(
    lookback_months: i64,
    target_date: NaiveDate,
    exchange_history: &[ExchangeEvent],
    stock: &[StockItem],
) -> Result<Vec<ForecastResult>, ForecastError> {
    forecast_at(Utc::now(), lookback_months, target_date, exchange_history, stock)
}

/// Forecast with an explicit "now".
///
/// Returns one result per toner name exchanged inside the window, ordered by
/// name. Toner types with stock but no exchanges in the window are omitted.
pub fn forecast_at(
    now: DateTime<Utc>,
    lookback_months: i64,
    target_date: NaiveDate,
    exchange_history: &[ExchangeEvent],
    stock: &[StockItem],
) -> Result<Vec<ForecastResult>, ForecastError> {
    let window = LookbackWindow::new(lookback_months)?;
    let horizon_months = months_between(&now, &target_date);

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for event in exchange_history {
        if window.contains(&now, &event.exchange_date) {
            *counts.entry(event.toner_name.as_str()).or_insert(0) += 1;
        }
    }

    let results: Vec<ForecastResult> = counts
        .into_iter()
        .map(|(toner_name, exchanges)| {
            let monthly_usage = exchanges.div_ceil(window.months());
            let needed_toners = projected_need(monthly_usage, horizon_months);
            let quantity = stock
                .iter()
                .find(|s| s.name == toner_name)
                .map(|s| s.quantity)
                .unwrap_or(0);

            ForecastResult {
                toner_name: toner_name.to_string(),
                needed_toners,
                quantity,
                must_buy: needed_toners.saturating_sub(quantity),
            }
        })
        .collect();

    tracing::debug!(
        lookback_months = window.months(),
        horizon_months,
        exchanges = exchange_history.len(),
        toner_types = results.len(),
        "computed toner forecast"
    );

    Ok(results)
}

/// Forecast straight from the collaborator readers.
///
/// Each reader is asked for one snapshot up front, so the computation runs on
/// a consistent copy even if the log is appended to concurrently.
pub fn forecast_from(
    exchanges: &dyn ExchangeLogReader,
    inventory: &dyn InventoryReader,
    now: DateTime<Utc>,
    lookback_months: i64,
    target_date: NaiveDate,
) -> Result<Vec<ForecastResult>, ForecastError> {
    // Validate before taking snapshots.
    LookbackWindow::new(lookback_months)?;

    let history = exchanges.exchanges(None);
    let stock = inventory.stock();
    forecast_at(now, lookback_months, target_date, &history, &stock)
}

/// Clamped: a target in the current or an earlier month needs nothing.
fn projected_need(monthly_usage: u64, horizon_months: i64) -> u64 {
    match u64::try_from(horizon_months) {
        Ok(months) => monthly_usage.saturating_mul(months),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exchange(toner: &str, serial: &str, y: i32, m: u32, d: u32) -> ExchangeEvent {
        ExchangeEvent {
            toner_name: toner.to_string(),
            equipment_serial_number: serial.to_string(),
            exchange_date: Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap(),
            performance_difference: 3000,
        }
    }

    fn stock(name: &str, quantity: u64) -> StockItem {
        StockItem {
            name: name.to_string(),
            quantity,
        }
    }

    #[test]
    fn worked_example_from_six_exchanges() {
        let history: Vec<ExchangeEvent> = (0..6)
            .map(|i| exchange("TonerX", "SN-1", 2024, 4 + (i % 3), 10))
            .collect();

        let results = forecast_at(now(), 3, date(2024, 10, 1), &history, &[stock("TonerX", 3)]).unwrap();

        assert_eq!(
            results,
            vec![ForecastResult {
                toner_name: "TonerX".to_string(),
                needed_toners: 8,
                quantity: 3,
                must_buy: 5,
            }]
        );
    }

    #[test]
    fn zero_lookback_is_invalid_argument() {
        let history = vec![exchange("TonerX", "SN-1", 2024, 6, 1)];
        let err = forecast_at(now(), 0, date(2024, 10, 1), &history, &[]).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidArgument(_)));
    }

    #[test]
    fn empty_history_yields_empty_forecast() {
        let results = forecast_at(now(), 6, date(2025, 1, 1), &[], &[stock("TonerX", 10)]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn stocked_toner_without_exchanges_is_omitted() {
        let history = vec![exchange("TonerA", "SN-1", 2024, 6, 1)];
        let results = forecast_at(
            now(),
            3,
            date(2024, 9, 1),
            &history,
            &[stock("TonerA", 0), stock("TonerB", 12)],
        )
        .unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.toner_name.as_str()).collect();
        assert_eq!(names, vec!["TonerA"]);
    }

    #[test]
    fn past_target_clamps_need_to_zero() {
        let history = vec![
            exchange("TonerX", "SN-1", 2024, 5, 1),
            exchange("TonerX", "SN-1", 2024, 6, 1),
        ];
        let results = forecast_at(now(), 3, date(2024, 1, 1), &history, &[stock("TonerX", 1)]).unwrap();

        assert_eq!(results[0].needed_toners, 0);
        assert_eq!(results[0].must_buy, 0);
        assert_eq!(results[0].quantity, 1);
    }

    #[test]
    fn same_month_target_needs_nothing() {
        let history = vec![exchange("TonerX", "SN-1", 2024, 6, 1)];
        let results = forecast_at(now(), 1, date(2024, 6, 30), &history, &[]).unwrap();
        assert_eq!(results[0].needed_toners, 0);
    }

    #[test]
    fn events_outside_window_are_ignored() {
        let history = vec![
            exchange("TonerX", "SN-1", 2024, 3, 1),
            exchange("TonerX", "SN-1", 2024, 2, 28),
            exchange("TonerY", "SN-2", 2023, 12, 1),
        ];
        let results = forecast_at(now(), 3, date(2024, 7, 1), &history, &[]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].toner_name, "TonerX");
        assert_eq!(results[0].needed_toners, 1);
        assert_eq!(results[0].must_buy, 1);
    }

    #[test]
    fn monthly_usage_rounds_up() {
        // 1 exchange over 12 months still counts as 1 per month.
        let history = vec![exchange("TonerX", "SN-1", 2024, 1, 1)];
        let results = forecast_at(now(), 12, date(2024, 9, 1), &history, &[]).unwrap();
        assert_eq!(results[0].needed_toners, 3);
    }

    #[test]
    fn huge_lookback_still_forecasts() {
        let history = vec![exchange("TonerX", "SN-1", 2024, 6, 1)];
        let results = forecast_at(now(), 5_000_000_000, date(2024, 9, 1), &history, &[]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].needed_toners, 3);
    }

    #[test]
    fn toner_names_match_case_sensitively() {
        let history = vec![exchange("TonerX", "SN-1", 2024, 6, 1)];
        let results = forecast_at(now(), 1, date(2024, 8, 1), &history, &[stock("tonerx", 5)]).unwrap();
        assert_eq!(results[0].quantity, 0);
        assert_eq!(results[0].must_buy, 2);
    }

    struct FixedLog(Vec<ExchangeEvent>);
    struct FixedStock(Vec<StockItem>);

    impl ExchangeLogReader for FixedLog {
        fn exchanges(&self, equipment_serial_number: Option<&str>) -> Vec<ExchangeEvent> {
            self.0
                .iter()
                .filter(|e| equipment_serial_number.is_none_or(|s| e.equipment_serial_number == s))
                .cloned()
                .collect()
        }
    }

    impl InventoryReader for FixedStock {
        fn stock(&self) -> Vec<StockItem> {
            self.0.clone()
        }
    }

    #[test]
    fn forecast_from_readers_uses_full_history() {
        let log = FixedLog(vec![
            exchange("TonerX", "SN-1", 2024, 6, 1),
            exchange("TonerX", "SN-2", 2024, 6, 2),
        ]);
        let inventory = FixedStock(vec![stock("TonerX", 1)]);

        let results = forecast_from(&log, &inventory, now(), 1, date(2024, 7, 1)).unwrap();
        assert_eq!(results[0].needed_toners, 2);
        assert_eq!(results[0].must_buy, 1);
    }

    fn arb_event() -> impl Strategy<Value = ExchangeEvent> {
        (
            prop::sample::select(vec!["TonerA", "TonerB", "TonerC", "TonerD"]),
            2022i32..2025,
            1u32..=12,
        )
            .prop_map(|(name, y, m)| exchange(name, "SN", y, m, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn must_buy_is_clamped_shortfall(
            history in prop::collection::vec(arb_event(), 0..60),
            quantities in prop::collection::vec(0u64..20, 4),
            lookback in 1i64..24,
            target_year in 2023i32..2027,
            target_month in 1u32..=12,
        ) {
            let levels: Vec<StockItem> = ["TonerA", "TonerB", "TonerC", "TonerD"]
                .iter()
                .zip(&quantities)
                .map(|(n, q)| stock(n, *q))
                .collect();

            let results = forecast_at(now(), lookback, date(target_year, target_month, 1), &history, &levels).unwrap();

            let mut seen = std::collections::HashSet::new();
            for r in &results {
                prop_assert!(seen.insert(r.toner_name.clone()), "duplicate toner in results");
                prop_assert_eq!(r.must_buy, r.needed_toners.saturating_sub(r.quantity));
                prop_assert!(history.iter().any(|e| e.toner_name == r.toner_name));
            }
        }

        #[test]
        fn non_positive_lookback_always_fails(
            history in prop::collection::vec(arb_event(), 0..10),
            lookback in -100i64..=0,
        ) {
            prop_assert!(forecast_at(now(), lookback, date(2025, 1, 1), &history, &[]).is_err());
        }
    }
}
