//! Tracing setup: subscriber install, span macros, and structured events.

pub mod events;
pub mod spans;

use sift_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SIFT_LOG";

/// Install the global subscriber.
///
/// `SIFT_LOG` wins over `config.log_level`. Returns `false` when a global
/// subscriber was already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let installed = if config.json {
        builder
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

