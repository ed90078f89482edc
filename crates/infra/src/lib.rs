//! Infrastructure layer: in-memory aggregate stores, projections, seed data.

pub mod dispatcher;
pub mod projections;
pub mod seed;

pub use dispatcher::{AggregateStore, DispatchError};
pub use projections::{ExchangeLog, Projection, StockLevelsProjection};
pub use seed::{SeedError, SeedFile, SeedSummary};
