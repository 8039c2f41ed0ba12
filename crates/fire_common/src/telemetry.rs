//! Telemetry and logging initialization
//!
//! Provides structured logging with `tracing` and `tracing-subscriber`.
//! stdout is reserved for the document report, all logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `--verbose` is passed
pub const VERBOSE_FILTER: &str = "debug,hyper=info,reqwest=info";

/// Filter used otherwise; the report itself is never logged
pub const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive for the requested verbosity
pub fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize tracing subscriber with appropriate configuration
///
/// `RUST_LOG` takes precedence over the verbosity flag.
///
/// # Arguments
/// * `verbose` - If true, sets log level to DEBUG, otherwise WARN
/// * `json_format` - If true, outputs logs in JSON format for machine parsing
///
/// # Example
/// ```
/// fire_common::telemetry::init_tracing(false, false);
/// tracing::warn!("Application started");
/// ```
pub fn init_tracing(verbose: bool, json_format: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .with(env_filter)
            .init();
    }
}
