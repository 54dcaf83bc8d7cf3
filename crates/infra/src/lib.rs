//! `storefront-infra` — storage adapters for the domain crates.
//!
//! Only in-memory implementations live here; they enforce the same
//! uniqueness and versioning rules a database-backed store must.

pub mod settlement_store;

pub use settlement_store::{InMemorySettlementStore, SettlementStore, SettlementStoreError};
