//! Settlement module (per-merchant daily reconciliation).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. The
//! storage row shape lives in [`record`] so adapters never reach into the
//! aggregate's fields.

pub mod config;
pub mod record;
pub mod settlement;

pub use config::SettlementConfig;
pub use record::SettlementRecord;
pub use settlement::{NOTES_MAX_CHARS, Settlement, SettlementStatus};
