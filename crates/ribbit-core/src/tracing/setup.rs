//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "RIBBIT_LOG";

/// Initialize the Ribbit tracing/logging system.
///
/// Reads `RIBBIT_LOG` for per-subsystem log levels, e.g.
/// `RIBBIT_LOG=ribbit_analysis::extraction=debug,ribbit_analysis::pipeline=info`.
///
/// Falls back to `ribbit=info` if `RIBBIT_LOG` is not set or is invalid.
/// Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("ribbit=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
