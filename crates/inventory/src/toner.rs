use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printfleet_core::{Aggregate, AggregateRoot, DomainError, TonerId};

/// Aggregate root: Toner (one consumable type held in stock).
///
/// `performance` is the rated page yield of one cartridge; `quantity` is the
/// on-hand count and never goes negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toner {
    id: TonerId,
    name: String,
    performance: u64,
    quantity: u64,
    version: u64,
    created: bool,
    removed: bool,
}

impl Toner {
    /// Create an empty, not-yet-registered aggregate instance.
    pub fn empty(id: TonerId) -> Self {
        Self {
            id,
            name: String::new(),
            performance: 0,
            quantity: 0,
            version: 0,
            created: false,
            removed: false,
        }
    }

    pub fn id_typed(&self) -> TonerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn performance(&self) -> u64 {
        self.performance
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Registered and not removed.
    pub fn is_active(&self) -> bool {
        self.created && !self.removed
    }
}

impl AggregateRoot for Toner {
    type Id = TonerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterToner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterToner {
    pub toner_id: TonerId,
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateToner (full replacement of the editable fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateToner {
    pub toner_id: TonerId,
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustQuantity {
    pub toner_id: TonerId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveToner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveToner {
    pub toner_id: TonerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TonerCommand {
    Register(RegisterToner),
    Update(UpdateToner),
    AdjustQuantity(AdjustQuantity),
    Remove(RemoveToner),
}

/// Event: TonerRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonerRegistered {
    pub toner_id: TonerId,
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TonerUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonerUpdated {
    pub toner_id: TonerId,
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityAdjusted {
    pub toner_id: TonerId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TonerRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonerRemoved {
    pub toner_id: TonerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TonerEvent {
    Registered(TonerRegistered),
    Updated(TonerUpdated),
    QuantityAdjusted(QuantityAdjusted),
    Removed(TonerRemoved),
}

impl TonerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            TonerEvent::Registered(_) => "inventory.toner.registered",
            TonerEvent::Updated(_) => "inventory.toner.updated",
            TonerEvent::QuantityAdjusted(_) => "inventory.toner.quantity_adjusted",
            TonerEvent::Removed(_) => "inventory.toner.removed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TonerEvent::Registered(e) => e.occurred_at,
            TonerEvent::Updated(e) => e.occurred_at,
            TonerEvent::QuantityAdjusted(e) => e.occurred_at,
            TonerEvent::Removed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Toner {
    type Command = TonerCommand;
    type Event = TonerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TonerEvent::Registered(e) => {
                self.id = e.toner_id;
                self.name = e.name.clone();
                self.performance = e.performance;
                self.quantity = e.quantity;
                self.created = true;
            }
            TonerEvent::Updated(e) => {
                self.name = e.name.clone();
                self.performance = e.performance;
                self.quantity = e.quantity;
            }
            TonerEvent::QuantityAdjusted(e) => {
                // handle() already rejected underflow; saturate on replay.
                self.quantity = self.quantity.saturating_add_signed(e.delta);
            }
            TonerEvent::Removed(_) => {
                self.removed = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TonerCommand::Register(cmd) => self.handle_register(cmd),
            TonerCommand::Update(cmd) => self.handle_update(cmd),
            TonerCommand::AdjustQuantity(cmd) => self.handle_adjust(cmd),
            TonerCommand::Remove(cmd) => self.handle_remove(cmd),
        }
    }
}

impl Toner {
    fn ensure_active(&self, toner_id: TonerId) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::not_found());
        }
        if self.id != toner_id {
            return Err(DomainError::invariant("toner_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterToner) -> Result<Vec<TonerEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("toner already exists"));
        }
        validate_name(&cmd.name)?;

        Ok(vec![TonerEvent::Registered(TonerRegistered {
            toner_id: cmd.toner_id,
            name: cmd.name.trim().to_string(),
            performance: cmd.performance,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateToner) -> Result<Vec<TonerEvent>, DomainError> {
        self.ensure_active(cmd.toner_id)?;
        validate_name(&cmd.name)?;

        Ok(vec![TonerEvent::Updated(TonerUpdated {
            toner_id: cmd.toner_id,
            name: cmd.name.trim().to_string(),
            performance: cmd.performance,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_adjust(&self, cmd: &AdjustQuantity) -> Result<Vec<TonerEvent>, DomainError> {
        self.ensure_active(cmd.toner_id)?;

        if cmd.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        if self.quantity.checked_add_signed(cmd.delta).is_none() {
            return Err(DomainError::invariant("quantity cannot go negative"));
        }

        Ok(vec![TonerEvent::QuantityAdjusted(QuantityAdjusted {
            toner_id: cmd.toner_id,
            delta: cmd.delta,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveToner) -> Result<Vec<TonerEvent>, DomainError> {
        self.ensure_active(cmd.toner_id)?;

        Ok(vec![TonerEvent::Removed(TonerRemoved {
            toner_id: cmd.toner_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}
