//! Process-wide tracing/logging setup.
//!
//! The domain crates emit spans and events through `tracing`; whichever
//! binary embeds the core calls [`init`] once at startup. Output is JSON with
//! timestamps, filtered via `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process, honoring `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
}

/// Initialize tracing with an explicit filter (tests, benches).
pub fn init_with_filter(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
