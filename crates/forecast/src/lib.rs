//! `printfleet-forecast`
//!
//! **Responsibility:** derived toner consumption data.
//!
//! - Pure computation over snapshots handed in by callers.
//! - Does not depend on the inventory/maintenance aggregates; infra maps them
//!   into [`ExchangeEvent`] and [`StockItem`] snapshots.
//! - Never mutates its inputs and holds no state between calls.

pub mod error;
pub mod forecaster;
pub mod snapshot;
pub mod usage;
pub mod window;

pub use error::ForecastError;
pub use forecaster::{ForecastResult, forecast, forecast_at, forecast_from};
pub use snapshot::{ExchangeEvent, ExchangeLogReader, InventoryReader, StockItem};
pub use usage::{UsageCount, usage_by_equipment, usage_by_toner};
pub use window::LookbackWindow;
