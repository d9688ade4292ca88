//! Command execution pipeline.
//!
//! One consistent path for every aggregate: load the stream, rehydrate,
//! let the aggregate decide, append the decided events with an optimistic
//! concurrency check. There is no publish step — read models in this system
//! are maintained synchronously by the service layer, not by downstream
//! consumers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use stackassign_core::{Aggregate, AggregateId, DomainError, Event, ExpectedVersion};

use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Deterministic domain failure (validation, lifecycle, authorization).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persisting to the event store failed.
    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// Failed to deserialize historical event payloads into the aggregate
    /// event type.
    #[error("event deserialization failed: {0}")]
    Deserialize(String),
}

impl DispatchError {
    /// Collapse into the domain error taxonomy the API surfaces.
    ///
    /// Optimistic-concurrency failures become `Conflict` (the caller may
    /// retry); the remaining infrastructure failures also surface as
    /// `Conflict` since nothing in this system is fatal to the process and
    /// the operation can be retried after the stream is repaired.
    pub fn into_domain(self) -> DomainError {
        match self {
            DispatchError::Domain(e) => e,
            DispatchError::Store(EventStoreError::Concurrency(msg)) => DomainError::conflict(msg),
            DispatchError::Store(e) => DomainError::conflict(e.to_string()),
            DispatchError::Deserialize(msg) => DomainError::conflict(msg),
        }
    }
}

/// Reusable command execution engine for event-modeled aggregates.
///
/// Generic over the store so tests run against [`crate::InMemoryEventStore`]
/// and a future durable backend slots in without touching domain code.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> CommandDispatcher<S>
where
    S: EventStore,
{
    /// Dispatch a command through the full pipeline.
    ///
    /// 1. Load the aggregate's stream and validate its shape.
    /// 2. Rehydrate state by applying history.
    /// 3. `handle` the command (pure; no mutation).
    /// 4. Append the decided events, expecting the loaded version.
    ///
    /// Returns the committed events (with assigned sequence numbers); an
    /// empty vector means the command was a no-op. A concurrent writer
    /// between load and append surfaces as `EventStoreError::Concurrency`.
    pub fn dispatch<A>(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: Event + Serialize + DeserializeOwned,
    {
        let history = self.store.load_stream(aggregate_id)?;
        validate_loaded_stream(aggregate_id, &history)?;
        let expected = ExpectedVersion::Exact(stream_version(&history));

        let mut aggregate = make_aggregate(aggregate_id);
        apply_history::<A>(&mut aggregate, history)?;

        let decided = aggregate.handle(&command).map_err(DispatchError::from)?;
        if decided.is_empty() {
            return Ok(vec![]);
        }
        tracing::debug!(aggregate_id = %aggregate_id, events = decided.len(), "appending decided events");

        let aggregate_type = aggregate_type.into();
        let uncommitted = decided
            .iter()
            .map(|ev| {
                UncommittedEvent::from_typed(
                    aggregate_id,
                    aggregate_type.clone(),
                    Uuid::now_v7(),
                    ev,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.store.append(uncommitted, expected)?)
    }

    /// Rehydrate an aggregate for a read path (views, policy checks).
    ///
    /// The returned aggregate may be in its not-yet-created state; callers
    /// decide whether that maps to `NotFound`.
    pub fn load<A>(
        &self,
        aggregate_id: AggregateId,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<A, DispatchError>
    where
        A: Aggregate,
        A::Event: DeserializeOwned,
    {
        let history = self.store.load_stream(aggregate_id)?;
        validate_loaded_stream(aggregate_id, &history)?;

        let mut aggregate = make_aggregate(aggregate_id);
        apply_history::<A>(&mut aggregate, history)?;
        Ok(aggregate)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<(), DispatchError> {
    // Defense in depth: reject mis-keyed or non-monotonic streams even if a
    // buggy backend returns them.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.aggregate_id != aggregate_id {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(
                format!("loaded stream contains wrong aggregate_id at index {idx}"),
            )));
        }
        if e.sequence_number <= last {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(
                format!(
                    "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                    e.sequence_number
                ),
            )));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: Vec<StoredEvent>) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = serde_json::from_value(stored.payload)
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::InMemoryEventStore;
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use stackassign_orders::{
        ChangeStatus, Order, OrderCommand, OrderId, OrderNumber, OrderStatus, PaperType,
        SubmitOrder,
    };
    use stackassign_pricing::AcademicLevel;
    use stackassign_core::{AggregateRoot, UserId};

    fn submit_command(order_id: OrderId) -> OrderCommand {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        OrderCommand::Submit(SubmitOrder {
            order_id,
            order_number: OrderNumber::generate(now, &mut rng),
            customer_id: UserId::new(),
            title: "Statistics coursework".to_string(),
            description: "Hypothesis testing exercises, five problems in total.".to_string(),
            subject: "Statistics".to_string(),
            academic_level: AcademicLevel::Master,
            paper_type: PaperType::Coursework,
            pages: 3,
            words: None,
            deadline: now + Duration::days(10),
            requirements: None,
            attachments: Vec::new(),
            occurred_at: now,
        })
    }

    #[test]
    fn dispatch_persists_and_rehydrates() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        let aggregate_id = stackassign_core::AggregateId::new();
        let order_id = OrderId::new(aggregate_id);

        let committed = dispatcher
            .dispatch::<Order>(aggregate_id, "order", submit_command(order_id), |id| {
                Order::empty(OrderId::new(id))
            })
            .unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].event_type, "order.submitted");

        let order = dispatcher
            .load::<Order>(aggregate_id, |id| Order::empty(OrderId::new(id)))
            .unwrap();
        assert!(order.is_created());
        assert_eq!(order.status(), OrderStatus::Pending);
        // 450 * 1.3 * 3, ten days out.
        assert_eq!(order.quote().unwrap().total_price, 1755);
    }

    #[test]
    fn domain_errors_pass_through() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        let aggregate_id = stackassign_core::AggregateId::new();
        let order_id = OrderId::new(aggregate_id);

        let err = dispatcher
            .dispatch::<Order>(
                aggregate_id,
                "order",
                OrderCommand::ChangeStatus(ChangeStatus {
                    order_id,
                    to: OrderStatus::Confirmed,
                    occurred_at: Utc::now(),
                }),
                |id| Order::empty(OrderId::new(id)),
            )
            .unwrap_err();

        assert_eq!(err.into_domain(), DomainError::NotFound);
    }

    #[test]
    fn no_op_commands_append_nothing() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        let aggregate_id = stackassign_core::AggregateId::new();
        let order_id = OrderId::new(aggregate_id);

        dispatcher
            .dispatch::<Order>(aggregate_id, "order", submit_command(order_id), |id| {
                Order::empty(OrderId::new(id))
            })
            .unwrap();

        let committed = dispatcher
            .dispatch::<Order>(
                aggregate_id,
                "order",
                OrderCommand::EditContent(stackassign_orders::EditContent {
                    order_id,
                    patch: stackassign_orders::ContentPatch::default(),
                    occurred_at: Utc::now(),
                }),
                |id| Order::empty(OrderId::new(id)),
            )
            .unwrap();
        assert!(committed.is_empty());

        let order = dispatcher
            .load::<Order>(aggregate_id, |id| Order::empty(OrderId::new(id)))
            .unwrap();
        assert_eq!(order.version(), 1);
    }
}
