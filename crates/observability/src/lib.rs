//! Process-wide tracing setup shared by every binary and test harness.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{init_with_filter, DEFAULT_FILTER};

/// Initialize process-wide observability (JSON tracing, `info` unless `RUST_LOG` says otherwise).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init_with_filter(DEFAULT_FILTER);
}
