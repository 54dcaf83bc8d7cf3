//! Tracing/logging setup shared by binaries and tests.

pub mod config;
pub mod subscriber;

pub use config::{LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing from the environment (`RUST_LOG`, `LOG_FORMAT`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let config = ObservabilityConfig::from_env();
    if subscriber::try_init(&config).is_ok() {
        tracing::debug!(filter = %config.filter, format = ?config.format, "tracing initialized");
    }
}
