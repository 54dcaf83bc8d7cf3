//! `storefront-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or transport concerns).

pub mod aggregate;
pub mod audit;
pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use audit::AuditStamp;
pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{MerchantId, SettlementId};
pub use money::{Currency, MONEY_SCALE, Money};
pub use value_object::ValueObject;
