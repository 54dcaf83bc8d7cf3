//! Inventory domain module.
//!
//! Business rules for on-hand stock, implemented purely as deterministic
//! domain logic (no IO, no storage).

pub mod quantity;

pub use quantity::InventoryQuantity;
