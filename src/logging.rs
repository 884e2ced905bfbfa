//! Logging initialization.
//!
//! Thin wrapper over `tracing-subscriber` for hosts that embed the crate
//! without their own subscriber. `RUST_LOG` overrides the default directive.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "build_herald=info";

/// Install a global fmt subscriber with the given filter directive.
///
/// A no-op when a subscriber is already installed, so embedding hosts and
/// tests can call it unconditionally.
pub fn init_with_filter(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// Install a global fmt subscriber with [`DEFAULT_LOG_FILTER`].
pub fn init() {
    init_with_filter(DEFAULT_LOG_FILTER);
}
