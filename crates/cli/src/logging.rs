//! One-time tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise only warnings are shown, or debug
//! output with `--verbose`. Logs go to stderr; stdout carries reports.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

pub(crate) fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let fallback = if verbose { "evolve=debug" } else { "evolve=warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .try_init();
        if let Err(e) = result {
            eprintln!("warning: logging disabled: {}", e);
        }
    });
}
