//! Logging setup for the anonconf binary.
//!
//! Logs always go to stderr; stdout is reserved for the generated XML.
//! `RUST_LOG` directives take precedence over the `--debug` / `--verbose`
//! flags.

use crate::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Maps the `--debug` / `--verbose` flags to a maximum log level.
///
/// Warnings and errors only by default, INFO with `verbose`, DEBUG with
/// `debug` (which implies verbose).
pub const fn log_level(debug: bool, verbose: bool) -> tracing::Level {
    match (debug, verbose) {
        (true, _) => tracing::Level::DEBUG,
        (false, true) => tracing::Level::INFO,
        (false, false) => tracing::Level::WARN,
    }
}

/// Environment variable holding `tracing` filter directives
pub const LOG_ENV_VAR: &str = "RUST_LOG";

/// Builds the log filter: directives from `RUST_LOG` when set, otherwise
/// the level picked by [`log_level`].
pub fn log_filter(debug: bool, verbose: bool) -> EnvFilter {
    filter_from_env(LOG_ENV_VAR, debug, verbose)
}

fn filter_from_env(env_var: &str, debug: bool, verbose: bool) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level(debug, verbose)).into())
        .with_env_var(env_var)
        .from_env_lossy()
}

/// Initializes structured logging on stderr.
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set.
///
/// # Example
/// ```rust,no_run
/// use anonconf_core::logging::init_logging;
///
/// init_logging(false, true).expect("Failed to initialize logging");
/// ```
pub fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug, verbose))
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_thread_ids(false)
        .with_file(debug)
        .with_line_number(debug)
        .try_init()
        .map_err(|e| {
            crate::AnonConfError::configuration(format!("Failed to initialize logging: {e}"))
        })?;

    Ok(())
}
