// ==========================================
// Logging init
// ==========================================
// tracing + tracing-subscriber, level via environment variable
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the logging system.
///
/// # Environment
/// - RUST_LOG: filter string (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=school_infra_dss=trace
///
/// # Example
/// ```no_run
/// use school_infra_dss::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Initialise logging for tests.
///
/// More verbose, and tolerates repeated initialisation across test cases.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
