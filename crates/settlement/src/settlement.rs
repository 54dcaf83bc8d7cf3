use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storefront_core::{
    AggregateRoot, AuditStamp, Clock, DomainError, DomainResult, Entity, MerchantId, Money,
    SettlementId,
};

use crate::config::SettlementConfig;

/// Longest note kept on a settlement (characters).
pub const NOTES_MAX_CHARS: usize = 1000;

/// Outcome of comparing the actual balance against the expected income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    /// Books and account agree to the cent.
    Matched,
    /// More money arrived than the books expected.
    Surplus,
    /// Less money arrived than the books expected.
    Deficit,
}

impl SettlementStatus {
    /// Status implied by `actual - expected`.
    pub fn from_difference(difference: &Money) -> Self {
        match difference.signum() {
            0 => SettlementStatus::Matched,
            s if s > 0 => SettlementStatus::Surplus,
            _ => SettlementStatus::Deficit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Matched => "MATCHED",
            SettlementStatus::Surplus => "SURPLUS",
            SettlementStatus::Deficit => "DEFICIT",
        }
    }
}

impl core::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettlementStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCHED" => Ok(SettlementStatus::Matched),
            "SURPLUS" => Ok(SettlementStatus::Surplus),
            "DEFICIT" => Ok(SettlementStatus::Deficit),
            other => Err(DomainError::validation(format!(
                "unknown settlement status {other:?}"
            ))),
        }
    }
}

/// Aggregate root: one merchant's reconciliation for one calendar day.
///
/// `difference` and `status` are derived once, at construction, and cannot be
/// changed afterwards; only the notes are editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub(crate) id: SettlementId,
    pub(crate) merchant_id: MerchantId,
    pub(crate) settlement_date: NaiveDate,
    pub(crate) expected_income: Option<Money>,
    pub(crate) actual_balance: Option<Money>,
    pub(crate) difference: Money,
    pub(crate) status: SettlementStatus,
    pub(crate) notes: String,
    pub(crate) audit: AuditStamp,
    pub(crate) version: u64,
}

impl Settlement {
    /// Record a settlement, tolerating absent amounts.
    ///
    /// If either amount is missing (or the two disagree on currency) the
    /// difference is a zero in the configured reference currency and the
    /// settlement reads as MATCHED. Use [`Settlement::try_new`] to reject those
    /// inputs instead.
    pub fn new(
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
        expected_income: Option<Money>,
        actual_balance: Option<Money>,
        clock: &dyn Clock,
    ) -> Self {
        Self::with_config(
            merchant_id,
            settlement_date,
            expected_income,
            actual_balance,
            &SettlementConfig::default(),
            clock,
        )
    }

    pub fn with_config(
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
        expected_income: Option<Money>,
        actual_balance: Option<Money>,
        config: &SettlementConfig,
        clock: &dyn Clock,
    ) -> Self {
        let difference = match (&expected_income, &actual_balance) {
            (Some(expected), Some(actual)) => {
                actual.checked_sub(expected).unwrap_or_else(|e| {
                    tracing::warn!(
                        merchant_id = %merchant_id,
                        date = %settlement_date,
                        error = %e,
                        "settlement amounts not comparable; recording zero difference"
                    );
                    Money::zero(config.reference_currency.clone())
                })
            }
            _ => {
                tracing::warn!(
                    merchant_id = %merchant_id,
                    date = %settlement_date,
                    expected_present = expected_income.is_some(),
                    actual_present = actual_balance.is_some(),
                    "settlement amount missing; recording zero difference"
                );
                Money::zero(config.reference_currency.clone())
            }
        };

        Self::derived(
            merchant_id,
            settlement_date,
            expected_income,
            actual_balance,
            difference,
            clock,
        )
    }

    /// Record a settlement from two amounts in the same currency.
    pub fn try_new(
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
        expected_income: Option<Money>,
        actual_balance: Option<Money>,
        clock: &dyn Clock,
    ) -> DomainResult<Self> {
        let expected = expected_income
            .ok_or_else(|| DomainError::validation("expected income is required"))?;
        let actual =
            actual_balance.ok_or_else(|| DomainError::validation("actual balance is required"))?;
        let difference = actual.checked_sub(&expected)?;

        Ok(Self::derived(
            merchant_id,
            settlement_date,
            Some(expected),
            Some(actual),
            difference,
            clock,
        ))
    }

    fn derived(
        merchant_id: MerchantId,
        settlement_date: NaiveDate,
        expected_income: Option<Money>,
        actual_balance: Option<Money>,
        difference: Money,
        clock: &dyn Clock,
    ) -> Self {
        let status = SettlementStatus::from_difference(&difference);
        tracing::debug!(
            merchant_id = %merchant_id,
            date = %settlement_date,
            difference = %difference,
            status = %status,
            "settlement recorded"
        );

        Self {
            id: SettlementId::new(),
            merchant_id,
            settlement_date,
            expected_income,
            actual_balance,
            difference,
            status,
            notes: String::new(),
            audit: AuditStamp::new(clock),
            version: 0,
        }
    }

    /// Replace the notes (`None` clears them) and mark the settlement updated.
    ///
    /// The text is kept as given. Storage rejects notes longer than
    /// [`NOTES_MAX_CHARS`].
    pub fn add_notes(&mut self, notes: Option<&str>, clock: &dyn Clock) {
        self.notes = notes.unwrap_or_default().to_string();
        self.audit.mark_updated(clock);
        self.version += 1;
    }

    /// True when the notes fit the storage column.
    pub fn notes_fit_column(&self) -> bool {
        self.notes.chars().count() <= NOTES_MAX_CHARS
    }

    pub fn is_matched(&self) -> bool {
        self.status == SettlementStatus::Matched
    }

    pub fn has_surplus(&self) -> bool {
        self.status == SettlementStatus::Surplus
    }

    pub fn has_deficit(&self) -> bool {
        self.status == SettlementStatus::Deficit
    }

    pub fn merchant_id(&self) -> MerchantId {
        self.merchant_id
    }

    pub fn settlement_date(&self) -> NaiveDate {
        self.settlement_date
    }

    pub fn expected_income(&self) -> Option<&Money> {
        self.expected_income.as_ref()
    }

    pub fn actual_balance(&self) -> Option<&Money> {
        self.actual_balance.as_ref()
    }

    pub fn difference(&self) -> &Money {
        &self.difference
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

impl Entity for Settlement {
    type Id = SettlementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }
}

impl AggregateRoot for Settlement {
    fn version(&self) -> u64 {
        self.version
    }
}
