//! Tracing/logging setup shared by the binaries.

/// Log output configuration (filters, format).
pub mod logging;

pub use logging::{LogConfig, LogFormat, ParseLogFormatError};

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(config: &LogConfig) {
    logging::init(config);
}
