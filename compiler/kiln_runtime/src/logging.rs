//! Tracing setup.
//!
//! Job workers run on named threads (`kiln-job#N`), so events carry the
//! thread name to tell evaluator output from worker output.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=kiln_runtime=debug` or `RUST_LOG=kiln_jobs=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        let layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_names(true);
        tracing_subscriber::registry()
            .with(layer)
            .with(EnvFilter::from_default_env())
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        assert!(TRACING_INIT.is_completed());
    }
}
