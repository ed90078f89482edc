//! Equipment maintenance domain module.
//!
//! Device registry plus the per-device repair history, page-meter readings
//! and toner exchange log. Pure domain logic (no IO, no HTTP, no storage).

pub mod equipment;
pub mod exchange;
pub mod meter;
pub mod repair;

pub use equipment::{
    Equipment, EquipmentCommand, EquipmentDetails, EquipmentEvent, EquipmentRegistered,
    EquipmentUpdated, MeterReadingRecorded, RecordMeterReading, RecordRepair, RecordTonerExchange,
    RegisterEquipment, RepairRecorded, UpdateEquipment,
};
pub use exchange::{ExchangeAssessment, TonerExchange};
pub use meter::{MeterKind, MeterReading, PeriodStats};
pub use repair::Repair;
