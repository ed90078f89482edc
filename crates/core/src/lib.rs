//! `printfleet-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod calendar;
pub mod error;
pub mod id;
pub mod paging;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use calendar::months_between;
pub use error::{DomainError, DomainResult};
pub use id::{EquipmentId, TonerId};
pub use paging::{Page, PageRequest, SortDirection, SortSpec, paginate};
