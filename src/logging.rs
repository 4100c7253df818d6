//! Stdout logging built on [tracing_subscriber].
pub mod config;
pub mod format;

use crate::logging::config::{LoggingConfig, LoggingError};
use tracing::debug;
use tracing_subscriber::fmt::format::PrettyFields;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Registers the global subscriber with a single stdout layer.
pub fn try_init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(config.format.ansi_colors)
        .with_target(config.format.target)
        .with_timer(ChronoLocal::new(config.format.timestamp.0.clone()))
        .fmt_fields(PrettyFields::new())
        .with_filter(config.logging_filter()?);

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|err| LoggingError::TryInit(err.to_string()))?;

    debug!("Logging initialized successfully");
    Ok(())
}
