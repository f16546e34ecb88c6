//! Subscriber installation

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{LogFormat, TelemetryConfig, TelemetryError};

/// Install the global subscriber; fails if one is already set or the
/// filter directives do not parse.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| TelemetryError::Filter(format!("{}: {}", config.filter, e)))?;

    // Exactly one of the two layers is present
    let (json, plain) = match config.format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_target(true).with_thread_ids(true)),
            None,
        ),
        LogFormat::Plain => (None, Some(fmt::layer().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        filter = %config.filter,
        format = ?config.format,
        "Logging ready"
    );

    Ok(())
}
