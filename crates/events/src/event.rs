use chrono::{DateTime, Utc};

/// A domain event.
///
/// Events are facts: immutable, versioned for schema evolution, and stamped
/// with the business time at which they occurred.
pub trait Event: Clone + core::fmt::Debug {
    /// Stable event name/type identifier (e.g. "catalog.product.unit_sold").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
