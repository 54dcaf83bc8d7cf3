//! Logging configuration read from the environment.

use std::str::FromStr;

pub const FILTER_ENV: &str = "RUST_LOG";
pub const FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable, multi-line.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => anyhow::bail!("unknown log format {other:?} (expected json|pretty)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `info,storefront_settlement=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup(FILTER_ENV)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        // The subscriber is not installed yet, so a bad value can only be ignored.
        let format = lookup(FORMAT_ENV)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        Self { filter, format }
    }
}
