//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; they represent
/// concepts where only the attribute values matter. `Money { cents: 100 }` is
/// a value object; a `Customer` with an id is an entity. To "modify" a value
/// object, build a new one.
///
/// The bounds keep value objects cheap to copy, comparable by value, and
/// debuggable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
