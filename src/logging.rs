//! Console logging bootstrap.
//!
//! The framework reports everything through the `tracing` facade and never
//! installs a subscriber on its own — the diagnostic channel belongs to the
//! host. This module is the shortcut for hosts that just want readable
//! console output.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INSTALLED: Once = Once::new();

/// Installs a console `tracing` subscriber (idempotent).
///
/// The filter comes from `RUST_LOG` when set, defaulting to `info`. If
/// another subscriber is already installed this quietly steps aside.
pub fn init() {
    INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_err()
        {
            eprintln!("ripple: a tracing subscriber is already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
