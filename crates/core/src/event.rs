//! Event metadata contract.

use chrono::{DateTime, Utc};

/// Metadata every domain event must expose.
///
/// The store persists events as typed payloads plus this metadata; it needs
/// a stable type tag, a schema version, and the time the event occurred.
/// Events carry their own `occurred_at` so domain logic never reads ambient
/// clocks.
pub trait Event {
    /// Stable, namespaced type tag (e.g. `"order.submitted"`).
    fn event_type(&self) -> &'static str;

    /// Schema version of the payload, starting at 1.
    fn version(&self) -> u32;

    /// When the event occurred (carried by the originating command).
    fn occurred_at(&self) -> DateTime<Utc>;
}
