use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use printfleet_core::{Aggregate, AggregateRoot, DomainError, EquipmentId};

use crate::exchange::{self, TonerExchange};
use crate::meter::MeterReading;
use crate::repair::Repair;

/// Minimum length of the free-text registration fields.
const MIN_TEXT_LEN: usize = 2;

/// Descriptive registration data of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentDetails {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub location: String,
    pub inventory_number: String,
    pub purchased_on: NaiveDate,
    pub seller: String,
    pub warranty_until: NaiveDate,
}

impl EquipmentDetails {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            ("name", &self.name),
            ("manufacturer", &self.manufacturer),
            ("model", &self.model),
            ("serial_number", &self.serial_number),
            ("location", &self.location),
            ("inventory_number", &self.inventory_number),
            ("seller", &self.seller),
        ];

        for (field, value) in fields {
            if value.trim().chars().count() < MIN_TEXT_LEN {
                return Err(DomainError::validation(format!(
                    "{field} must be at least {MIN_TEXT_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Aggregate root: Equipment (a printer, copier or similar device).
///
/// Owns the device's repair history, page-meter readings and toner exchange
/// log. All three are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    id: EquipmentId,
    details: Option<EquipmentDetails>,
    repairs: Vec<Repair>,
    meter_readings: Vec<MeterReading>,
    exchanges: Vec<TonerExchange>,
    version: u64,
}

impl Equipment {
    /// Create an empty, not-yet-registered aggregate instance.
    pub fn empty(id: EquipmentId) -> Self {
        Self {
            id,
            details: None,
            repairs: Vec::new(),
            meter_readings: Vec::new(),
            exchanges: Vec::new(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> EquipmentId {
        self.id
    }

    pub fn details(&self) -> Option<&EquipmentDetails> {
        self.details.as_ref()
    }

    pub fn repairs(&self) -> &[Repair] {
        &self.repairs
    }

    /// Readings ordered by date (oldest first).
    pub fn meter_readings(&self) -> &[MeterReading] {
        &self.meter_readings
    }

    /// Exchanges in recording order.
    pub fn exchanges(&self) -> &[TonerExchange] {
        &self.exchanges
    }

    pub fn latest_meter_reading(&self) -> Option<&MeterReading> {
        self.meter_readings.last()
    }
}

impl AggregateRoot for Equipment {
    type Id = EquipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterEquipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEquipment {
    pub equipment_id: EquipmentId,
    pub details: EquipmentDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateEquipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEquipment {
    pub equipment_id: EquipmentId,
    pub details: EquipmentDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordRepair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRepair {
    pub equipment_id: EquipmentId,
    pub repair: Repair,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordMeterReading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeterReading {
    pub equipment_id: EquipmentId,
    pub reading: MeterReading,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordTonerExchange.
///
/// `toner_performance` is the rated yield of the toner taken from stock; it
/// is only used to flag a premature exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTonerExchange {
    pub equipment_id: EquipmentId,
    pub toner_name: String,
    pub toner_performance: u64,
    pub meter_count: u64,
    pub exchanged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentCommand {
    Register(RegisterEquipment),
    Update(UpdateEquipment),
    RecordRepair(RecordRepair),
    RecordMeterReading(RecordMeterReading),
    RecordTonerExchange(RecordTonerExchange),
}

/// Event: EquipmentRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRegistered {
    pub equipment_id: EquipmentId,
    pub details: EquipmentDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EquipmentUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentUpdated {
    pub equipment_id: EquipmentId,
    pub details: EquipmentDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RepairRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRecorded {
    pub equipment_id: EquipmentId,
    pub repair: Repair,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MeterReadingRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterReadingRecorded {
    pub equipment_id: EquipmentId,
    pub reading: MeterReading,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentEvent {
    Registered(EquipmentRegistered),
    Updated(EquipmentUpdated),
    RepairRecorded(RepairRecorded),
    MeterReadingRecorded(MeterReadingRecorded),
    TonerExchanged(TonerExchange),
}

impl EquipmentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            EquipmentEvent::Registered(_) => "maintenance.equipment.registered",
            EquipmentEvent::Updated(_) => "maintenance.equipment.updated",
            EquipmentEvent::RepairRecorded(_) => "maintenance.equipment.repair_recorded",
            EquipmentEvent::MeterReadingRecorded(_) => "maintenance.equipment.meter_reading_recorded",
            EquipmentEvent::TonerExchanged(_) => "maintenance.equipment.toner_exchanged",
        }
    }

    /// For an exchange this is when the cartridge went in, not when it was entered.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EquipmentEvent::Registered(e) => e.occurred_at,
            EquipmentEvent::Updated(e) => e.occurred_at,
            EquipmentEvent::RepairRecorded(e) => e.occurred_at,
            EquipmentEvent::MeterReadingRecorded(e) => e.occurred_at,
            EquipmentEvent::TonerExchanged(e) => e.exchanged_at,
        }
    }
}

impl Aggregate for Equipment {
    type Command = EquipmentCommand;
    type Event = EquipmentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            EquipmentEvent::Registered(e) => {
                self.id = e.equipment_id;
                self.details = Some(e.details.clone());
            }
            EquipmentEvent::Updated(e) => {
                self.details = Some(e.details.clone());
            }
            EquipmentEvent::RepairRecorded(e) => {
                self.repairs.push(e.repair.clone());
            }
            EquipmentEvent::MeterReadingRecorded(e) => {
                // Keep readings ordered by date; same-day readings keep arrival order.
                let at = self
                    .meter_readings
                    .partition_point(|r| r.date <= e.reading.date);
                self.meter_readings.insert(at, e.reading.clone());
            }
            EquipmentEvent::TonerExchanged(e) => {
                self.exchanges.push(e.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            EquipmentCommand::Register(cmd) => self.handle_register(cmd),
            EquipmentCommand::Update(cmd) => self.handle_update(cmd),
            EquipmentCommand::RecordRepair(cmd) => self.handle_repair(cmd),
            EquipmentCommand::RecordMeterReading(cmd) => self.handle_meter_reading(cmd),
            EquipmentCommand::RecordTonerExchange(cmd) => self.handle_exchange(cmd),
        }
    }
}

impl Equipment {
    fn ensure_registered(&self, equipment_id: EquipmentId) -> Result<&EquipmentDetails, DomainError> {
        let details = self.details.as_ref().ok_or_else(DomainError::not_found)?;
        if self.id != equipment_id {
            return Err(DomainError::invariant("equipment_id mismatch"));
        }
        Ok(details)
    }

    fn handle_register(&self, cmd: &RegisterEquipment) -> Result<Vec<EquipmentEvent>, DomainError> {
        if self.details.is_some() {
            return Err(DomainError::conflict("equipment already exists"));
        }
        cmd.details.validate()?;

        Ok(vec![EquipmentEvent::Registered(EquipmentRegistered {
            equipment_id: cmd.equipment_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateEquipment) -> Result<Vec<EquipmentEvent>, DomainError> {
        self.ensure_registered(cmd.equipment_id)?;
        cmd.details.validate()?;

        Ok(vec![EquipmentEvent::Updated(EquipmentUpdated {
            equipment_id: cmd.equipment_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_repair(&self, cmd: &RecordRepair) -> Result<Vec<EquipmentEvent>, DomainError> {
        self.ensure_registered(cmd.equipment_id)?;
        cmd.repair.validate()?;

        Ok(vec![EquipmentEvent::RepairRecorded(RepairRecorded {
            equipment_id: cmd.equipment_id,
            repair: cmd.repair.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_meter_reading(&self, cmd: &RecordMeterReading) -> Result<Vec<EquipmentEvent>, DomainError> {
        self.ensure_registered(cmd.equipment_id)?;

        if let Some(latest) = self.latest_meter_reading() {
            if cmd.reading.printed_pages < latest.printed_pages {
                return Err(DomainError::invariant(
                    "printed page counter cannot be lower than the previous reading",
                ));
            }
            if cmd.reading.copied_pages < latest.copied_pages {
                return Err(DomainError::invariant(
                    "copied page counter cannot be lower than the previous reading",
                ));
            }
        }

        Ok(vec![EquipmentEvent::MeterReadingRecorded(MeterReadingRecorded {
            equipment_id: cmd.equipment_id,
            reading: cmd.reading.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_exchange(&self, cmd: &RecordTonerExchange) -> Result<Vec<EquipmentEvent>, DomainError> {
        let details = self.ensure_registered(cmd.equipment_id)?;

        if cmd.toner_name.trim().is_empty() {
            return Err(DomainError::validation("toner_name cannot be empty"));
        }

        let previous = self.exchanges.last().map(|e| e.meter_count);
        let assessment = exchange::assess(previous, cmd.meter_count, cmd.toner_performance);

        Ok(vec![EquipmentEvent::TonerExchanged(TonerExchange {
            equipment_id: cmd.equipment_id,
            equipment_serial_number: details.serial_number.clone(),
            toner_name: cmd.toner_name.clone(),
            meter_count: cmd.meter_count,
            performance_difference: assessment.performance_difference,
            premature: assessment.premature,
            exchanged_at: cmd.exchanged_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn details() -> EquipmentDetails {
        EquipmentDetails {
            name: "Office printer".to_string(),
            manufacturer: "Brother".to_string(),
            model: "HL-L2350DW".to_string(),
            serial_number: "E78123K0N".to_string(),
            location: "Room 204".to_string(),
            inventory_number: "INV-0042".to_string(),
            purchased_on: date(2022, 3, 14),
            seller: "Office Supplies Ltd".to_string(),
            warranty_until: date(2025, 3, 14),
        }
    }

    fn execute(equipment: &mut Equipment, cmd: EquipmentCommand) -> Result<Vec<EquipmentEvent>, DomainError> {
        equipment.execute(&cmd)
    }

    fn registered() -> Equipment {
        let id = EquipmentId::new();
        let mut equipment = Equipment::empty(id);
        execute(
            &mut equipment,
            EquipmentCommand::Register(RegisterEquipment {
                equipment_id: id,
                details: details(),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        equipment
    }

    fn exchange(equipment: &Equipment, meter_count: u64) -> EquipmentCommand {
        EquipmentCommand::RecordTonerExchange(RecordTonerExchange {
            equipment_id: equipment.id_typed(),
            toner_name: "TN-2420".to_string(),
            toner_performance: 3000,
            meter_count,
            exchanged_at: Utc::now(),
        })
    }

    fn reading(equipment: &Equipment, day: u32, printed: u64, copied: u64) -> EquipmentCommand {
        EquipmentCommand::RecordMeterReading(RecordMeterReading {
            equipment_id: equipment.id_typed(),
            reading: MeterReading {
                date: date(2024, 5, day),
                printed_pages: printed,
                copied_pages: copied,
            },
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn short_fields_are_rejected() {
        let id = EquipmentId::new();
        let mut d = details();
        d.serial_number = "X".to_string();

        let err = Equipment::empty(id)
            .handle(&EquipmentCommand::Register(RegisterEquipment {
                equipment_id: id,
                details: d,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.starts_with("serial_number")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn commands_on_unregistered_equipment_are_not_found() {
        let equipment = Equipment::empty(EquipmentId::new());
        assert_eq!(
            equipment.handle(&exchange(&equipment, 100)).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn exchange_measures_against_previous_exchange() {
        let mut equipment = registered();

        let cmd = exchange(&equipment, 3100);
        let first = execute(&mut equipment, cmd).unwrap();
        let cmd = exchange(&equipment, 4000);
        let second = execute(&mut equipment, cmd).unwrap();

        match (&first[0], &second[0]) {
            (EquipmentEvent::TonerExchanged(a), EquipmentEvent::TonerExchanged(b)) => {
                assert_eq!(a.performance_difference, 3100);
                assert!(!a.premature);
                assert_eq!(a.equipment_serial_number, "E78123K0N");

                assert_eq!(b.performance_difference, 900);
                assert!(b.premature);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert_eq!(equipment.exchanges().len(), 2);
    }

    #[test]
    fn exchange_events_are_dated_by_the_exchange() {
        let mut equipment = registered();
        let installed = Utc::now() - chrono::Duration::days(40);
        let equipment_id = equipment.id_typed();
        let events = execute(
            &mut equipment,
            EquipmentCommand::RecordTonerExchange(RecordTonerExchange {
                equipment_id,
                toner_name: "TN-2420".to_string(),
                toner_performance: 3000,
                meter_count: 3000,
                exchanged_at: installed,
            }),
        )
        .unwrap();

        assert_eq!(events[0].occurred_at(), installed);
    }

    #[test]
    fn meter_counter_cannot_go_backwards() {
        let mut equipment = registered();
        let cmd = reading(&equipment, 1, 1000, 500);
        execute(&mut equipment, cmd).unwrap();

        let cmd = reading(&equipment, 2, 999, 600);
        let err = execute(&mut equipment, cmd).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("printed")));

        let cmd = reading(&equipment, 2, 1200, 499);
        let err = execute(&mut equipment, cmd).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("copied")));
    }

    #[test]
    fn readings_are_kept_in_date_order() {
        let mut equipment = registered();
        let cmd = reading(&equipment, 20, 100, 10);
        execute(&mut equipment, cmd).unwrap();
        let cmd = reading(&equipment, 5, 150, 10);
        execute(&mut equipment, cmd).unwrap();

        let days: Vec<u32> = equipment
            .meter_readings()
            .iter()
            .map(|r| chrono::Datelike::day(&r.date))
            .collect();
        assert_eq!(days, vec![5, 20]);
    }

    #[test]
    fn repair_needs_description() {
        let mut equipment = registered();
        let equipment_id = equipment.id_typed();
        let err = execute(
            &mut equipment,
            EquipmentCommand::RecordRepair(RecordRepair {
                equipment_id,
                repair: Repair {
                    date: date(2024, 6, 1),
                    location: "Service center".to_string(),
                    description: String::new(),
                    cost: 12_000,
                },
                occurred_at: Utc::now(),
            }),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(equipment.repairs().is_empty());
    }

    proptest! {
        /// Property: the performance differences of successive exchanges add
        /// up to the last meter count (each measured from the previous one).
        #[test]
        fn exchange_differences_telescope(meters in prop::collection::vec(0u64..1_000_000, 1..20)) {
            let mut equipment = registered();
            for m in &meters {
                let cmd = exchange(&equipment, *m);
                execute(&mut equipment, cmd).unwrap();
            }

            let sum: i64 = equipment.exchanges().iter().map(|e| e.performance_difference).sum();
            prop_assert_eq!(sum, *meters.last().unwrap() as i64);
            prop_assert_eq!(equipment.version(), meters.len() as u64 + 1);
        }
    }
}
