#![forbid(unsafe_code)]

//! Logging setup for native hosts.
//!
//! The crate itself only emits `tracing` events. In the browser,
//! `vetrom-web` installs its console layer at module start; native tools can
//! enable the `subscriber` feature and call [`init_subscriber`].

/// Target used by every event this crate emits.
pub const LOG_TARGET: &str = "vetrom";

/// Install a global fmt subscriber filtered by `filter` (e.g. `"vetrom=debug"`).
///
/// `RUST_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed.
#[cfg(feature = "subscriber")]
pub fn init_subscriber(filter: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
