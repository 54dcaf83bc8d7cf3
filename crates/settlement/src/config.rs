//! Settlement configuration (environment driven).

use storefront_core::Currency;

/// Env var naming the currency used for zero differences when an amount is absent.
pub const REFERENCE_CURRENCY_ENV: &str = "SETTLEMENT_REFERENCE_CURRENCY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Currency of the zero `difference` recorded when either amount is missing.
    pub reference_currency: Currency,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            reference_currency: Currency::cny(),
        }
    }
}

impl SettlementConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let reference_currency = match lookup(REFERENCE_CURRENCY_ENV) {
            None => Currency::cny(),
            Some(raw) => Currency::new(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    value = %raw,
                    error = %e,
                    "invalid {}; using CNY",
                    REFERENCE_CURRENCY_ENV
                );
                Currency::cny()
            }),
        };
        Self { reference_currency }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_cny() {
        assert_eq!(SettlementConfig::from_lookup(|_| None), SettlementConfig::default());
        assert_eq!(SettlementConfig::default().reference_currency.code(), "CNY");
    }

    #[test]
    fn reads_reference_currency() {
        let config = SettlementConfig::from_lookup(|key| {
            (key == REFERENCE_CURRENCY_ENV).then(|| "usd".to_string())
        });
        assert_eq!(config.reference_currency.code(), "USD");
    }

    #[test]
    fn invalid_currency_falls_back() {
        let config = SettlementConfig::from_lookup(|_| Some("dollars".to_string()));
        assert_eq!(config, SettlementConfig::default());
    }
}
