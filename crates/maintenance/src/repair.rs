use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use printfleet_core::DomainError;

/// One entry of an equipment's repair history.
///
/// `cost` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub cost: u64,
}

impl Repair {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.location.trim().is_empty() {
            return Err(DomainError::validation("repair location cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("repair description cannot be empty"));
        }
        Ok(())
    }
}
