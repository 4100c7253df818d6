use serde::{Deserialize, Serialize};

/// Timestamp format following
/// [chrono strftime](https://docs.rs/chrono/latest/chrono/format/strftime/index.html).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TimestampFormat(pub(crate) String);

impl Default for TimestampFormat {
    fn default() -> Self {
        Self("%Y-%m-%dT%H:%M:%S".to_string())
    }
}

/// Shape of every log line.
///
/// - `target`: include the target of the event.
/// - `timestamp`: the [TimestampFormat] used for the line prefix.
/// - `ansi_colors`: colorize the output.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct LoggingFormat {
    #[serde(default)]
    pub(crate) target: bool,
    #[serde(default)]
    pub(crate) timestamp: TimestampFormat,
    #[serde(default)]
    pub(crate) ansi_colors: bool,
}
