//! Structured logging setup.

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, Logs};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `logs.level`.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn configure(logs: &Logs) -> Result<bool> {
    let level = logs.level_filter()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let installed = match logs.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_file(logs.caller)
                    .with_line_number(logs.caller),
            )
            .try_init()
            .is_ok(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_file(logs.caller)
                    .with_line_number(logs.caller),
            )
            .try_init()
            .is_ok(),
    };

    debug!(
        component = "logger",
        event = "configured",
        level = %logs.level,
        format = %logs.format,
        caller = logs.caller,
        installed,
        "logger configured"
    );

    Ok(installed)
}
