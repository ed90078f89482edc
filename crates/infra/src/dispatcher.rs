//! Command execution pipeline over in-memory aggregate stores.
//!
//! ```text
//! Command
//!   ↓
//! 1. Load current aggregate state (or a fresh empty instance)
//!   ↓
//! 2. Optimistic concurrency check against the expected version
//!   ↓
//! 3. Handle command (pure decision logic, produces events)
//!   ↓
//! 4. Apply events, append them to the aggregate's history
//!   ↓
//! 5. Feed events to the registered projections
//! ```
//!
//! Steps 1–5 run under one write lock, so projections observe events in
//! commit order and a command never interleaves with another on the same
//! store.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use printfleet_core::{Aggregate, DomainError, ExpectedVersion};

use crate::projections::Projection;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Optimistic concurrency failure or duplicate creation.
    #[error("conflict: {0}")]
    Concurrency(String),
    /// Domain validation failure (deterministic).
    #[error("validation failed: {0}")]
    Validation(String),
    /// Domain invariant failure (deterministic).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// Domain-level not found.
    #[error("not found")]
    NotFound,
    /// The store lock was poisoned by a panicking writer.
    #[error("store unavailable: {0}")]
    Store(String),
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => DispatchError::Validation(msg),
            DomainError::InvariantViolation(msg) => DispatchError::InvariantViolation(msg),
            DomainError::Conflict(msg) => DispatchError::Concurrency(msg),
            DomainError::NotFound => DispatchError::NotFound,
            DomainError::InvalidId(msg) => DispatchError::Validation(msg),
        }
    }
}

#[derive(Debug)]
struct Stream<A: Aggregate> {
    state: A,
    history: Vec<A::Event>,
}

type ProjectionList<E> = Vec<Arc<dyn Projection<E>>>;

/// In-memory aggregate store + dispatcher.
///
/// Keys are ordered, so `list()` follows id order (UUIDv7 ids → creation order).
pub struct AggregateStore<A>
where
    A: Aggregate,
{
    aggregate_type: &'static str,
    streams: RwLock<BTreeMap<A::Id, Stream<A>>>,
    projections: RwLock<ProjectionList<A::Event>>,
}

impl<A> core::fmt::Debug for AggregateStore<A>
where
    A: Aggregate,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AggregateStore")
            .field("aggregate_type", &self.aggregate_type)
            .finish_non_exhaustive()
    }
}

impl<A> AggregateStore<A>
where
    A: Aggregate<Error = DomainError> + Clone,
    A::Id: Ord,
{
    pub fn new(aggregate_type: &'static str) -> Self {
        Self {
            aggregate_type,
            streams: RwLock::new(BTreeMap::new()),
            projections: RwLock::new(Vec::new()),
        }
    }

    /// Register a projection fed with every event committed from now on.
    pub fn subscribe(&self, projection: Arc<dyn Projection<A::Event>>) {
        if let Ok(mut projections) = self.projections.write() {
            projections.push(projection);
        }
    }

    /// Dispatch a command and return the committed events.
    ///
    /// `make_aggregate` builds the empty instance for an id with no stream yet.
    pub fn dispatch(
        &self,
        aggregate_id: A::Id,
        expected_version: ExpectedVersion,
        command: A::Command,
        make_aggregate: impl FnOnce(&A::Id) -> A,
    ) -> Result<Vec<A::Event>, DispatchError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|e| DispatchError::Store(e.to_string()))?;

        let mut state = match streams.get(&aggregate_id) {
            Some(stream) => stream.state.clone(),
            None => make_aggregate(&aggregate_id),
        };
        expected_version.check(state.version())?;

        let events = state.execute(&command)?;
        if events.is_empty() {
            return Ok(events);
        }
        let version = state.version();

        match streams.entry(aggregate_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let stream = occupied.get_mut();
                stream.state = state;
                stream.history.extend(events.iter().cloned());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Stream {
                    state,
                    history: events.clone(),
                });
            }
        }

        if let Ok(projections) = self.projections.read() {
            for projection in projections.iter() {
                for event in &events {
                    projection.apply(event);
                }
            }
        }

        tracing::info!(
            aggregate_type = self.aggregate_type,
            aggregate_id = ?aggregate_id,
            version,
            events = events.len(),
            "command committed"
        );

        Ok(events)
    }

    /// Current state of one aggregate.
    pub fn get(&self, aggregate_id: &A::Id) -> Option<A> {
        let streams = self.streams.read().ok()?;
        streams.get(aggregate_id).map(|s| s.state.clone())
    }

    /// Current state of every aggregate, in id order.
    pub fn list(&self) -> Vec<A> {
        match self.streams.read() {
            Ok(streams) => streams.values().map(|s| s.state.clone()).collect(),
            Err(_) => vec![],
        }
    }

    /// Committed events of one aggregate, oldest first.
    pub fn history(&self, aggregate_id: &A::Id) -> Vec<A::Event> {
        match self.streams.read() {
            Ok(streams) => streams
                .get(aggregate_id)
                .map(|s| s.history.clone())
                .unwrap_or_default(),
            Err(_) => vec![],
        }
    }
}
