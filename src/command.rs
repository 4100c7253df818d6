//! Command line interface for the budget guard.
//!
//! Parses the command line arguments and decides how the application runs as defined in [Command].
#![warn(missing_docs)]

use crate::config::{load_config, ConfigError, ConfigOverrides, GuardConfig, ProjectId};
use crate::gcp::project::{detect_project_id, ProjectIdError};
use crate::http::client::{HttpClient, ReqwestHttpClient};
use crate::http::reqwest::ReqwestBuildError;
use crate::logging::config::LoggingError;
use crate::logging::try_init_logging;
use crate::run::RunContext;
use crate::utils::binary_metadata::binary_metadata;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// All possible errors that can happen while running the initialization.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The config could not be loaded
    #[error("could not load the configuration: {0}")]
    Config(#[from] ConfigError),
    /// Logging could not be initialized
    #[error("could not initialize logging: {0}")]
    Logging(#[from] LoggingError),
    /// The HTTP client could not be built
    #[error("could not build the HTTP client: {0}")]
    HttpClient(#[from] ReqwestBuildError),
    /// No project is configured and discovery failed
    #[error("`GCP_PROJECT` is not set and the project could not be discovered: {0}")]
    ProjectId(#[from] ProjectIdError),
}

/// Command line arguments, as parsed by [`clap`].
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)] // Read from `Cargo.toml`
pub struct Command {
    /// Path to a YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overriding `server.port` and `PORT`.
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    version: bool,
}

impl Command {
    /// Checks if the flag to show the version was set
    fn print_version(&self) -> bool {
        self.version
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// Runs the provided main function or shows the binary information according to flags
    pub fn run<F>(main_fn: F) -> ExitCode
    where
        F: Fn(RunContext<ReqwestHttpClient>) -> Result<(), Box<dyn Error>>,
    {
        let flags = Self::parse();

        if flags.print_version() {
            println!("{}", binary_metadata());
            return ExitCode::SUCCESS;
        }

        let Ok(run_context) = flags.init().inspect_err(|err| {
            // Using print because logging might have failed to start
            println!("Error on budget guard initialization: {err}");
        }) else {
            return ExitCode::FAILURE;
        };

        match main_fn(run_context) {
            Ok(_) => {
                info!("The budget guard exited successfully");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("The budget guard exited with an error: {err}");
                ExitCode::FAILURE
            }
        }
    }

    fn init(&self) -> Result<RunContext<ReqwestHttpClient>, InitError> {
        let config = load_config(self.config.as_deref(), &self.overrides())?;
        try_init_logging(&config.log)?;

        info!("{}", binary_metadata());
        if let Some(path) = &self.config {
            info!("Starting budget guard with config file '{}'", path.display());
        }

        let http_client = ReqwestHttpClient::try_new(&config.http)?;
        let project_id = resolve_project_id(&config, &http_client)?;

        Ok(RunContext {
            config,
            project_id,
            http_client: Arc::new(http_client),
        })
    }
}

/// Returns the configured project or asks the metadata server for it.
pub fn resolve_project_id<C: HttpClient>(
    config: &GuardConfig,
    http_client: &C,
) -> Result<ProjectId, ProjectIdError> {
    if let Some(project_id) = config.project_id() {
        return Ok(project_id.clone());
    }
    info!("no project configured, asking the metadata server");
    let project_id = detect_project_id(http_client, &config.auth.metadata_endpoint)?;
    info!(%project_id, "project discovered");
    Ok(ProjectId::from(project_id))
}
