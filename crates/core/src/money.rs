//! Money value object: decimal amount + ISO 4217 currency code.
//!
//! Amounts are kept at scale 2 (the `precision 19, scale 2` storage columns),
//! rounded half away from zero on construction. Arithmetic never converts
//! between currencies; mixing them is a `CurrencyMismatch`.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Decimal places kept on every amount.
pub const MONEY_SCALE: u32 = 2;

/// Three-letter upper-case currency code (e.g. `CNY`, `USD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> DomainResult<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "currency code must be three ASCII letters, got {code:?}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Chinese yuan, the reference currency for settlements.
    pub fn cny() -> Self {
        Self("CNY".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl ValueObject for Currency {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "MoneyRow")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

/// Wire shape of [`Money`]; deserialized amounts go through [`Money::new`].
#[derive(Deserialize)]
struct MoneyRow {
    amount: Decimal,
    currency: Currency,
}

impl From<MoneyRow> for Money {
    fn from(row: MoneyRow) -> Self {
        Money::new(row.amount, row.currency)
    }
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        let mut amount =
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(MONEY_SCALE);
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Parse a decimal amount string, e.g. `Money::parse("120.00", Currency::cny())`.
    pub fn parse(amount: &str, currency: Currency) -> DomainResult<Self> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|e| DomainError::validation(format!("invalid money amount {amount:?}: {e}")))?;
        Ok(Self::new(amount, currency))
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.amount.is_zero() && self.amount.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.amount.is_zero() && self.amount.is_sign_negative()
    }

    /// -1, 0 or 1 following the sign of the amount.
    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.amount.is_sign_positive() {
            1
        } else {
            -1
        }
    }

    pub fn checked_add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::validation("money addition overflowed"))?;
        Ok(Money::new(sum, self.currency.clone()))
    }

    /// `self - other`, both in the same currency.
    pub fn checked_sub(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let diff = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| DomainError::validation("money subtraction overflowed"))?;
        Ok(Money::new(diff, self.currency.clone()))
    }

    fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::currency_mismatch(
                self.currency.code(),
                other.currency.code(),
            ));
        }
        Ok(())
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

impl ValueObject for Money {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cny(amount: &str) -> Money {
        Money::parse(amount, Currency::cny()).unwrap()
    }

    #[test]
    fn amounts_are_normalized_to_two_decimals() {
        assert_eq!(cny("100").to_string(), "100.00 CNY");
        assert_eq!(cny("0.005").amount(), Decimal::new(1, 2));
        assert_eq!(cny("-0.005").amount(), Decimal::new(-1, 2));
    }

    #[test]
    fn subtraction_keeps_currency_and_sign() {
        let diff = cny("80.00").checked_sub(&cny("100.00")).unwrap();
        assert_eq!(diff, cny("-20.00"));
        assert_eq!(diff.signum(), -1);
        assert!(diff.is_negative());
        assert!(!diff.is_positive());
    }

    #[test]
    fn mixing_currencies_is_rejected() {
        let usd = Money::parse("1.00", Currency::new("usd").unwrap()).unwrap();
        let err = cny("1.00").checked_sub(&usd).unwrap_err();
        assert_eq!(err, DomainError::currency_mismatch("CNY", "USD"));
        assert!(cny("1.00").checked_add(&usd).is_err());
    }

    #[test]
    fn zero_has_no_sign() {
        let zero = cny("100.00").checked_sub(&cny("100.00")).unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.signum(), 0);
        assert_eq!(zero, Money::zero(Currency::cny()));
    }

    #[test]
    fn currency_codes_are_validated() {
        assert!(Currency::new("CN").is_err());
        assert!(Currency::new("C1Y").is_err());
        assert_eq!(Currency::new(" eur ").unwrap().code(), "EUR");
        assert!(serde_json::from_str::<Currency>("\"YUAN\"").is_err());
    }

    #[test]
    fn deserialized_amounts_are_normalized() {
        let money: Money =
            serde_json::from_str(r#"{"amount":"1.005","currency":"CNY"}"#).unwrap();
        assert_eq!(money.amount().scale(), MONEY_SCALE);
        assert_eq!(money, cny("1.01"));
        assert_eq!(money.to_string(), "1.01 CNY");
    }

    #[test]
    fn money_serializes_amount_as_string() {
        let json = serde_json::to_value(cny("12.5")).unwrap();
        assert_eq!(json["amount"], "12.50");
        assert_eq!(json["currency"], "CNY");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: subtracting then adding back the same amount returns the
        /// original, and the difference carries the sign of `a - b`.
        #[test]
        fn sub_then_add_restores_original(
            a in -1_000_000_000i64..1_000_000_000,
            b in -1_000_000_000i64..1_000_000_000,
        ) {
            let left = Money::new(Decimal::new(a, 2), Currency::cny());
            let right = Money::new(Decimal::new(b, 2), Currency::cny());

            let diff = left.checked_sub(&right).unwrap();
            prop_assert_eq!(diff.amount().scale(), MONEY_SCALE);
            prop_assert_eq!(diff.signum(), (a - b).signum() as i32);
            prop_assert_eq!(diff.checked_add(&right).unwrap(), left);
        }
    }
}
