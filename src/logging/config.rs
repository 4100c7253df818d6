use super::format::LoggingFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid logging level `{level}`: {reason}")]
    InvalidLevel { level: String, reason: String },
    #[error("init logging error: `{0}`")]
    TryInit(String),
}

/// `level` accepts either a plain level (`debug`) or a list of filter directives
/// (`info,gcp_budget_guard::gcp=trace`).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub(crate) level: String,
    #[serde(default)]
    pub(crate) format: LoggingFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LoggingFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub(crate) fn logging_filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::builder()
            .parse(&self.level)
            .map_err(|err| LoggingError::InvalidLevel {
                level: self.level.clone(),
                reason: err.to_string(),
            })
    }
}
