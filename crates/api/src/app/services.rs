use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use printfleet_core::{EquipmentId, ExpectedVersion, TonerId};
use printfleet_forecast::{
    ExchangeEvent, ExchangeLogReader, ForecastError, ForecastResult, UsageCount, forecast_from,
    usage_by_equipment, usage_by_toner,
};
use printfleet_infra::{
    AggregateStore, DispatchError, ExchangeLog, SeedError, SeedFile, SeedSummary,
    StockLevelsProjection,
};
use printfleet_inventory::{AdjustQuantity, StockQuery, Toner, TonerCommand, TonerEvent, TonerSummary};
use printfleet_maintenance::{
    Equipment, EquipmentCommand, EquipmentEvent, RecordTonerExchange, TonerExchange,
};

/// Application services shared by every handler.
///
/// Owns both aggregate stores and the read models fed by them. Projections
/// are updated inside `dispatch`, so a read right after a successful write
/// sees it.
#[derive(Debug)]
pub struct AppServices {
    toners: AggregateStore<Toner>,
    equipment: AggregateStore<Equipment>,
    stock: Arc<StockLevelsProjection>,
    exchange_log: Arc<ExchangeLog>,
    default_lookback_months: i64,
}

impl AppServices {
    pub fn new(default_lookback_months: i64) -> Self {
        let toners = AggregateStore::new("inventory.toner");
        let equipment = AggregateStore::new("maintenance.equipment");
        let stock = Arc::new(StockLevelsProjection::new());
        let exchange_log = Arc::new(ExchangeLog::new());

        toners.subscribe(stock.clone());
        equipment.subscribe(exchange_log.clone());

        Self {
            toners,
            equipment,
            stock,
            exchange_log,
            default_lookback_months,
        }
    }

    pub fn default_lookback_months(&self) -> i64 {
        self.default_lookback_months
    }

    pub fn seed(&self, seed: &SeedFile) -> Result<SeedSummary, SeedError> {
        seed.apply(&self.toners, &self.equipment)
    }

    // -------------------------
    // Toner stock
    // -------------------------

    pub fn dispatch_toner(
        &self,
        toner_id: TonerId,
        command: TonerCommand,
    ) -> Result<Vec<TonerEvent>, DispatchError> {
        self.toners
            .dispatch(toner_id, ExpectedVersion::Any, command, |id| Toner::empty(*id))
    }

    pub fn toner(&self, toner_id: &TonerId) -> Option<TonerSummary> {
        self.stock.get(toner_id)
    }

    pub fn toner_page(&self, query: &StockQuery) -> printfleet_core::Page<TonerSummary> {
        query.run(self.stock.list())
    }

    /// Every committed event of one toner, removal included.
    pub fn toner_history(&self, toner_id: &TonerId) -> Vec<TonerEvent> {
        self.toners.history(toner_id)
    }

    // -------------------------
    // Equipment
    // -------------------------

    pub fn dispatch_equipment(
        &self,
        equipment_id: EquipmentId,
        command: EquipmentCommand,
    ) -> Result<Vec<EquipmentEvent>, DispatchError> {
        self.equipment
            .dispatch(equipment_id, ExpectedVersion::Any, command, |id| Equipment::empty(*id))
    }

    /// Registered equipment only; an id with no stream is `None`.
    pub fn equipment(&self, equipment_id: &EquipmentId) -> Option<Equipment> {
        self.equipment
            .get(equipment_id)
            .filter(|e| e.details().is_some())
    }

    pub fn equipment_history(&self, equipment_id: &EquipmentId) -> Vec<EquipmentEvent> {
        self.equipment.history(equipment_id)
    }

    pub fn equipment_list(&self) -> Vec<Equipment> {
        self.equipment
            .list()
            .into_iter()
            .filter(|e| e.details().is_some())
            .collect()
    }

    /// Take one toner out of stock and record it as installed in a device.
    ///
    /// The stock decrement commits first; if the device then rejects the
    /// exchange, the cartridge is returned to stock.
    pub fn record_exchange(
        &self,
        equipment_id: EquipmentId,
        toner_name: &str,
        meter_count: u64,
        exchanged_at: DateTime<Utc>,
    ) -> Result<TonerExchange, DispatchError> {
        if self.equipment(&equipment_id).is_none() {
            return Err(DispatchError::NotFound);
        }

        let toner = self
            .stock
            .find_by_name(toner_name)
            .ok_or(DispatchError::NotFound)?;
        if toner.quantity == 0 {
            return Err(DispatchError::InvariantViolation(format!(
                "toner {} is out of stock",
                toner.name
            )));
        }

        self.adjust_stock(toner.id, -1)?;

        let recorded = self.dispatch_equipment(
            equipment_id,
            EquipmentCommand::RecordTonerExchange(RecordTonerExchange {
                equipment_id,
                toner_name: toner.name.clone(),
                toner_performance: toner.performance,
                meter_count,
                exchanged_at,
            }),
        );

        let events = match recorded {
            Ok(events) => events,
            Err(err) => {
                if let Err(restore) = self.adjust_stock(toner.id, 1) {
                    tracing::warn!(
                        toner_id = %toner.id,
                        error = %restore,
                        "failed to return toner to stock after rejected exchange"
                    );
                }
                return Err(err);
            }
        };

        events
            .into_iter()
            .find_map(|e| match e {
                EquipmentEvent::TonerExchanged(exchange) => Some(exchange),
                _ => None,
            })
            .ok_or_else(|| DispatchError::Store("exchange was not recorded".to_string()))
    }

    fn adjust_stock(&self, toner_id: TonerId, delta: i64) -> Result<Vec<TonerEvent>, DispatchError> {
        self.dispatch_toner(
            toner_id,
            TonerCommand::AdjustQuantity(AdjustQuantity {
                toner_id,
                delta,
                occurred_at: Utc::now(),
            }),
        )
    }

    // -------------------------
    // Reports
    // -------------------------

    pub fn exchange_history(&self, equipment_serial_number: Option<&str>) -> Vec<ExchangeEvent> {
        self.exchange_log.exchanges(equipment_serial_number)
    }

    pub fn forecast(
        &self,
        lookback_months: i64,
        target_date: NaiveDate,
    ) -> Result<Vec<ForecastResult>, ForecastError> {
        forecast_from(
            self.exchange_log.as_ref(),
            self.stock.as_ref(),
            Utc::now(),
            lookback_months,
            target_date,
        )
    }

    pub fn toner_usage(&self, lookback_months: i64) -> Result<Vec<UsageCount>, ForecastError> {
        usage_by_toner(lookback_months, &self.exchange_history(None), Utc::now())
    }

    pub fn equipment_usage(&self, lookback_months: i64) -> Result<Vec<UsageCount>, ForecastError> {
        usage_by_equipment(lookback_months, &self.exchange_history(None), Utc::now())
    }
}
