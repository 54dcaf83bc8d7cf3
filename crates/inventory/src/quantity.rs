use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ValueObject};

/// On-hand stock of a product: a non-negative unit count.
///
/// Immutable. `add` and `reduce` return a new value and leave the receiver
/// untouched; there is no way to observe a negative quantity.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct InventoryQuantity {
    quantity: i64,
}

impl InventoryQuantity {
    /// Storage column holding the unit count (non-null integer).
    pub const COLUMN: &'static str = "quantity";

    pub const ZERO: Self = Self { quantity: 0 };

    pub fn new(quantity: i64) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::validation(
                "inventory quantity cannot be negative",
            ));
        }
        Ok(Self { quantity })
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Receive `additional` units.
    pub fn add(self, additional: i64) -> DomainResult<Self> {
        if additional <= 0 {
            tracing::debug!(additional, "rejected non-positive inventory addition");
            return Err(DomainError::validation("additional quantity must be positive"));
        }
        let quantity = self
            .quantity
            .checked_add(additional)
            .ok_or_else(|| DomainError::validation("inventory quantity overflow"))?;
        Ok(Self { quantity })
    }

    /// Remove `amount` units; fails when fewer than `amount` are on hand.
    pub fn reduce(self, amount: i64) -> DomainResult<Self> {
        if amount <= 0 {
            tracing::debug!(amount, "rejected non-positive inventory reduction");
            return Err(DomainError::validation("reduce quantity must be positive"));
        }
        if amount > self.quantity {
            tracing::debug!(
                requested = amount,
                available = self.quantity,
                "insufficient inventory"
            );
            return Err(DomainError::insufficient_inventory(amount, self.quantity));
        }
        Ok(Self {
            quantity: self.quantity - amount,
        })
    }

    pub fn has_enough_inventory(&self, required: i64) -> bool {
        self.quantity >= required
    }

    pub fn has_inventory(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

impl ValueObject for InventoryQuantity {}

impl TryFrom<i64> for InventoryQuantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InventoryQuantity> for i64 {
    fn from(value: InventoryQuantity) -> Self {
        value.quantity
    }
}

impl core::fmt::Display for InventoryQuantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} units", self.quantity)
    }
}
