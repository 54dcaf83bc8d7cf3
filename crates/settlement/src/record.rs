//! Storage row for [`Settlement`].
//!
//! One column per field, money split into amount + currency. This is the only
//! way to rebuild a settlement with a given identity, status and version, so
//! storage adapters go through [`Settlement::restore`] instead of setters.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{
    AuditStamp, Currency, DomainError, DomainResult, MerchantId, Money, SettlementId,
};

use crate::config::SettlementConfig;
use crate::settlement::{NOTES_MAX_CHARS, Settlement, SettlementStatus};

pub const TABLE: &str = "settlements";

/// Index over `settlement_date`.
pub const IDX_DATE: &str = "idx_settlement_date";
/// Unique index over (`merchant_id`, `settlement_date`).
pub const IDX_MERCHANT_DATE: &str = "idx_settlement_merchant_date";
/// Index over `status`.
pub const IDX_STATUS: &str = "idx_settlement_status";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: SettlementId,
    pub merchant_id: i64,
    pub settlement_date: NaiveDate,
    pub expected_income_amount: Option<Decimal>,
    pub expected_income_currency: Option<String>,
    pub actual_balance_amount: Option<Decimal>,
    pub actual_balance_currency: Option<String>,
    pub difference_amount: Option<Decimal>,
    pub difference_currency: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

fn split_money(money: Option<&Money>) -> (Option<Decimal>, Option<String>) {
    match money {
        Some(m) => (Some(m.amount()), Some(m.currency().code().to_string())),
        None => (None, None),
    }
}

fn join_money(
    column: &str,
    amount: Option<Decimal>,
    currency: Option<&str>,
) -> DomainResult<Option<Money>> {
    match (amount, currency) {
        (Some(amount), Some(code)) => Ok(Some(Money::new(amount, Currency::new(code)?))),
        (None, None) => Ok(None),
        _ => Err(DomainError::validation(format!(
            "{column}: amount and currency must both be present or both be null"
        ))),
    }
}

/// Stored difference must be `actual - expected`, or the zero fallback when the
/// two amounts are in different currencies.
fn ensure_difference(expected: &Money, actual: &Money, stored: &Money) -> DomainResult<()> {
    match actual.checked_sub(expected) {
        Ok(computed) if computed == *stored => Ok(()),
        Ok(computed) => Err(DomainError::invariant(format!(
            "stored difference {stored} does not equal actual - expected ({computed})"
        ))),
        Err(DomainError::CurrencyMismatch { .. }) if stored.is_zero() => Ok(()),
        Err(DomainError::CurrencyMismatch { .. }) => Err(DomainError::invariant(format!(
            "stored difference {stored} is not zero for amounts in different currencies"
        ))),
        Err(e) => Err(e),
    }
}

impl Settlement {
    /// Flatten into a storage row.
    pub fn to_record(&self) -> SettlementRecord {
        let (expected_income_amount, expected_income_currency) =
            split_money(self.expected_income.as_ref());
        let (actual_balance_amount, actual_balance_currency) =
            split_money(self.actual_balance.as_ref());
        let (difference_amount, difference_currency) = split_money(Some(&self.difference));

        SettlementRecord {
            id: self.id,
            merchant_id: self.merchant_id.value(),
            settlement_date: self.settlement_date,
            expected_income_amount,
            expected_income_currency,
            actual_balance_amount,
            actual_balance_currency,
            difference_amount,
            difference_currency,
            status: self.status.as_str().to_string(),
            notes: Some(self.notes.clone()),
            created_at: self.audit.created_at(),
            updated_at: self.audit.updated_at(),
            version: self.version,
        }
    }

    /// Rebuild a settlement from a storage row.
    ///
    /// A row with a null difference gets it re-derived from the amounts (zero
    /// in the reference currency when an amount is null). Rows whose stored
    /// difference or status disagree with what the amounts imply are rejected.
    pub fn restore(record: SettlementRecord) -> DomainResult<Self> {
        let expected_income = join_money(
            "expected_income",
            record.expected_income_amount,
            record.expected_income_currency.as_deref(),
        )?;
        let actual_balance = join_money(
            "actual_balance",
            record.actual_balance_amount,
            record.actual_balance_currency.as_deref(),
        )?;
        let difference = match join_money(
            "difference",
            record.difference_amount,
            record.difference_currency.as_deref(),
        )? {
            Some(d) => d,
            None => match (&expected_income, &actual_balance) {
                (Some(e), Some(a)) => a.checked_sub(e)?,
                _ => Money::zero(SettlementConfig::default().reference_currency),
            },
        };
        if let (Some(e), Some(a)) = (&expected_income, &actual_balance) {
            ensure_difference(e, a, &difference)?;
        }

        let status: SettlementStatus = record.status.parse()?;
        let derived = SettlementStatus::from_difference(&difference);
        if status != derived {
            return Err(DomainError::invariant(format!(
                "stored status {status} contradicts difference {difference} ({derived})"
            )));
        }

        let notes = record.notes.unwrap_or_default();
        if notes.chars().count() > NOTES_MAX_CHARS {
            return Err(DomainError::validation(format!(
                "notes exceed {NOTES_MAX_CHARS} characters"
            )));
        }

        Ok(Self {
            id: record.id,
            merchant_id: MerchantId::new(record.merchant_id),
            settlement_date: record.settlement_date,
            expected_income,
            actual_balance,
            difference,
            status,
            notes,
            audit: AuditStamp::restore(record.created_at, record.updated_at),
            version: record.version,
        })
    }
}
