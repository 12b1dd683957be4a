//! Log setup for the RBAC binaries: `info` at start, raised to `debug`
//! once a config file with `"debug": true` has been read.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    // An explicit RUST_LOG always beats the built-in level.
    let base_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Swap the active level filter; a no-op before `init_tracing`.
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(level);
        });
    }
}

/// Switch to `debug` when the config file asks for it, unless `RUST_LOG` is set.
pub fn apply_config_debug(debug: bool) {
    if debug && std::env::var_os("RUST_LOG").is_none() {
        apply_logging_level("debug");
        tracing::debug!("debug logging enabled by configuration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_can_be_raised_after_init() {
        init_tracing_with_level("warn");
        assert!(LOG_RELOAD_HANDLE.get().is_some());

        apply_config_debug(true);
        apply_logging_level("info");
        tracing::info!("still logging after a level swap");
    }
}
