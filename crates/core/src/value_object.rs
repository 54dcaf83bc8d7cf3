//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new instance from the old one:
///
/// ```ignore
/// let stock = InventoryQuantity::new(5)?;
/// let after_sale = stock.reduce(2)?; // `stock` is untouched
/// assert_eq!(after_sale, InventoryQuantity::new(3)?);
/// ```
///
/// Entities, by contrast, are compared by identifier (see [`crate::Entity`]).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
