//! Tracing subscriber initialisation
//!
//! `RUST_LOG` takes precedence over the configured level, so a deployment
//! can raise verbosity without editing its config file.

use optiq_domain::{LogFormat, LoggingConfig, OptiqError, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber
///
/// # Errors
/// - `OptiqError::Config` if the level directive does not parse
/// - `OptiqError::Internal` if a global subscriber is already installed
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .try_init(),
    };

    installed.map_err(|e| OptiqError::Internal(format!("Failed to initialise tracing: {e}")))
}

/// Filter from `RUST_LOG` when set, otherwise from the configured level
fn build_filter(level: &str, rust_log: Option<String>) -> Result<EnvFilter> {
    let directives = rust_log.filter(|value| !value.trim().is_empty());
    let directives = directives.as_deref().unwrap_or(level);

    EnvFilter::try_new(directives)
        .map_err(|e| OptiqError::Config(format!("Invalid log filter '{directives}': {e}")))
}
