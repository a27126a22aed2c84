//! Tracing and logging setup shared by every binary and test harness.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat, ParseLogFormatError};

/// Initialize process-wide tracing with JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide tracing with an explicit configuration.
pub fn init_with(config: &LogConfig) {
    tracing::init_with(config);
}
