use duration_str::deserialize_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONN_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeouts applied to every outgoing request.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub(crate) timeout: Duration,
    #[serde(
        default = "default_conn_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub(crate) conn_timeout: Duration,
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration) -> Self {
        Self {
            timeout,
            conn_timeout,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_CONN_TIMEOUT)
    }
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_conn_timeout() -> Duration {
    DEFAULT_CONN_TIMEOUT
}
