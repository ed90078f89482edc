//! Projection implementations (read model builders).
//!
//! Projections consume committed domain events and build query-oriented read
//! models. They are fed synchronously by [`crate::dispatcher::AggregateStore`]
//! in commit order and are disposable: replaying the history rebuilds them.

pub mod exchange_log;
pub mod stock_levels;

pub use exchange_log::ExchangeLog;
pub use stock_levels::StockLevelsProjection;

/// Consumer of committed events of one aggregate type.
pub trait Projection<E>: Send + Sync {
    fn apply(&self, event: &E);
}
