//! Tracing and logging setup shared by binaries and tests.

/// Initialize process-wide tracing with the default filter (`info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
