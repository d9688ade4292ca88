//! `stackassign-infra` — persistence collaborators.
//!
//! Everything the domain treats as "the persistence layer" lives here: an
//! append-only event store behind a trait (in-memory implementation included),
//! the command dispatcher that drives aggregates through it, and the unique
//! index that backs slug and order-number uniqueness.

pub mod command_dispatcher;
pub mod event_store;
pub mod unique_index;

pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};
pub use unique_index::{IndexError, UniqueIndex};
