//! JSON seed data: initial toners, equipment and their history.
//!
//! Seeded exchanges are historical records; they do not draw from the
//! seeded stock.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use printfleet_core::{EquipmentId, ExpectedVersion, TonerId};
use printfleet_inventory::{RegisterToner, Toner, TonerCommand};
use printfleet_maintenance::{
    Equipment, EquipmentCommand, EquipmentDetails, MeterReading, RecordMeterReading, RecordRepair,
    RecordTonerExchange, RegisterEquipment, Repair,
};

use crate::dispatcher::{AggregateStore, DispatchError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed record rejected ({context}): {source}")]
    Rejected {
        context: String,
        #[source]
        source: DispatchError,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub toners: Vec<SeedToner>,
    #[serde(default)]
    pub equipment: Vec<SeedEquipment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedToner {
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedEquipment {
    #[serde(flatten)]
    pub details: EquipmentDetails,
    #[serde(default)]
    pub repairs: Vec<Repair>,
    #[serde(default)]
    pub meter_readings: Vec<MeterReading>,
    #[serde(default)]
    pub exchanges: Vec<SeedExchange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedExchange {
    pub toner_name: String,
    pub meter_count: u64,
    pub exchanged_at: DateTime<Utc>,
}

/// Counts of what a seed run created.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub toners: usize,
    pub equipment: usize,
    pub exchanges: usize,
}

impl SeedFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Register everything in the seed through the regular command path.
    pub fn apply(
        &self,
        toners: &AggregateStore<Toner>,
        equipment: &AggregateStore<Equipment>,
    ) -> Result<SeedSummary, SeedError> {
        let now = Utc::now();
        let mut summary = SeedSummary::default();

        for toner in &self.toners {
            let toner_id = TonerId::new();
            toners
                .dispatch(
                    toner_id,
                    ExpectedVersion::Exact(0),
                    TonerCommand::Register(RegisterToner {
                        toner_id,
                        name: toner.name.clone(),
                        performance: toner.performance,
                        quantity: toner.quantity,
                        occurred_at: now,
                    }),
                    |id| Toner::empty(*id),
                )
                .map_err(|source| SeedError::Rejected {
                    context: format!("toner {}", toner.name),
                    source,
                })?;
            summary.toners += 1;
        }

        for device in &self.equipment {
            let equipment_id = EquipmentId::new();
            let context = format!("equipment {}", device.details.serial_number);
            let rejected = |source| SeedError::Rejected {
                context: context.clone(),
                source,
            };

            let mut commands = vec![EquipmentCommand::Register(RegisterEquipment {
                equipment_id,
                details: device.details.clone(),
                occurred_at: now,
            })];
            commands.extend(device.repairs.iter().map(|repair| {
                EquipmentCommand::RecordRepair(RecordRepair {
                    equipment_id,
                    repair: repair.clone(),
                    occurred_at: now,
                })
            }));
            commands.extend(device.meter_readings.iter().map(|reading| {
                EquipmentCommand::RecordMeterReading(RecordMeterReading {
                    equipment_id,
                    reading: reading.clone(),
                    occurred_at: now,
                })
            }));
            commands.extend(device.exchanges.iter().map(|exchange| {
                EquipmentCommand::RecordTonerExchange(RecordTonerExchange {
                    equipment_id,
                    toner_name: exchange.toner_name.clone(),
                    toner_performance: self.rated_yield(&exchange.toner_name),
                    meter_count: exchange.meter_count,
                    exchanged_at: exchange.exchanged_at,
                })
            }));

            for command in commands {
                equipment
                    .dispatch(equipment_id, ExpectedVersion::Any, command, |id| Equipment::empty(*id))
                    .map_err(rejected)?;
            }

            summary.equipment += 1;
            summary.exchanges += device.exchanges.len();
        }

        tracing::info!(
            toners = summary.toners,
            equipment = summary.equipment,
            exchanges = summary.exchanges,
            "seed data loaded"
        );

        Ok(summary)
    }

    /// Rated yield of a seeded toner; 0 (never premature) when unknown.
    fn rated_yield(&self, toner_name: &str) -> u64 {
        self.toners
            .iter()
            .find(|t| t.name == toner_name)
            .map(|t| t.performance)
            .unwrap_or(0)
    }
}
