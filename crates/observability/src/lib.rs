//! Tracing/logging setup shared by the Wemakit binaries.

/// Initialize process-wide tracing with `default_filter` as the fallback
/// directive when `RUST_LOG` is unset.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(default_filter: &str) {
    tracing::init(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
