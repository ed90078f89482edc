//! Toner stock domain module.
//!
//! Business rules for the consumable catalog, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod listing;
pub mod toner;

pub use listing::{StockQuery, TonerSortKey, TonerSummary};
pub use toner::{
    AdjustQuantity, QuantityAdjusted, RegisterToner, RemoveToner, Toner, TonerCommand, TonerEvent,
    TonerRegistered, TonerRemoved, TonerUpdated, UpdateToner,
};
