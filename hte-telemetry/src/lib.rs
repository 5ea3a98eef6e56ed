//! Structured logging initialization for HTE/BTEP binaries.
//!
//! ```no_run
//! hte_telemetry::init_telemetry("hte-cli").expect("telemetry init");
//! hte_telemetry::info!("starting up");
//! ```

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::{Span, debug, error, info, instrument, trace, warn};

static INIT: Once = Once::new();

/// Initialize console logging with `RUST_LOG`-style env filtering
/// (defaults to `info` when unset). Safe to call more than once; only the
/// first call takes effect.
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")).expect("env filter");

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
            .init();

        tracing::info!(service.name = service_name, "telemetry initialized");
    });

    Ok(())
}
