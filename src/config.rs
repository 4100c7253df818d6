//! Service configuration.
//!
//! Values are layered, later sources winning over earlier ones:
//! 1. Optional YAML file.
//! 2. `GCP_BUDGET_GUARD_*` environment variables, `__` separating nested keys.
//!    Eg. `GCP_BUDGET_GUARD_ACTIONS__STOP_INSTANCES=true`.
//! 3. `GCP_PROJECT` and `PORT` environment variables.
//! 4. Command line overrides.
use crate::gcp::auth::AuthConfig;
use crate::gcp::billing::BillingConfig;
use crate::gcp::compute::ComputeConfig;
use crate::http::config::HttpConfig;
use crate::http_server::config::ServerConfig;
use crate::logging::config::LoggingConfig;
use crate::remediation::ActionsConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;
use thiserror::Error;

pub const CONFIG_ENV_VAR_PREFIX: &str = "GCP_BUDGET_GUARD";
pub const PROJECT_ENV_VAR: &str = "GCP_PROJECT";
pub const PORT_ENV_VAR: &str = "PORT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("loading config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid `{PORT_ENV_VAR}` value `{0}`")]
    InvalidPort(String),
}

/// Identifier of the project every action targets.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Hash, Clone)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct GuardConfig {
    /// When absent the project is discovered through the metadata server.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LoggingConfig,
}

impl GuardConfig {
    /// The configured project, ignoring empty values.
    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id
            .as_ref()
            .filter(|project_id| !project_id.as_str().trim().is_empty())
    }
}

/// Values coming from the command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Builds the configuration from every source. A missing `path` is not an error, a path
/// pointing to a missing file is.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<GuardConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
    }

    let port = non_empty_env(PORT_ENV_VAR)
        .map(|port| {
            port.parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port))
        })
        .transpose()?;

    let config = builder
        .add_source(
            Environment::with_prefix(CONFIG_ENV_VAR_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("project_id", non_empty_env(PROJECT_ENV_VAR))?
        .set_override_option("server.port", port.map(i64::from))?
        .set_override_option("server.host", overrides.host.clone())?
        .set_override_option("server.port", overrides.port.map(i64::from))?
        .build()?
        .try_deserialize::<GuardConfig>()?;

    Ok(config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
