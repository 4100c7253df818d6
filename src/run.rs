//! Wires the cloud clients, the handler and the HTTP server together.
use crate::config::{GuardConfig, ProjectId};
use crate::gcp::api::ApiClient;
use crate::gcp::auth::{MetadataTokenRetriever, StaticTokenRetriever, TokenRetriever};
use crate::gcp::billing::BillingClient;
use crate::gcp::compute::ComputeClient;
use crate::handler::BudgetEventHandler;
use crate::http::client::HttpClient;
use crate::http_server::run_server;
use crate::remediation::Remediator;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("could not build the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("HTTP server error: {0}")]
    Server(#[source] std::io::Error),
}

pub type GuardHandler<C> = BudgetEventHandler<ComputeClient<C>, BillingClient<C>>;

/// Everything needed to start serving.
pub struct RunContext<C: HttpClient> {
    pub config: GuardConfig,
    pub project_id: ProjectId,
    pub http_client: Arc<C>,
}

pub struct GuardRunner<C: HttpClient> {
    context: RunContext<C>,
}

impl<C> GuardRunner<C>
where
    C: HttpClient + Send + Sync + 'static,
{
    pub fn new(context: RunContext<C>) -> Self {
        Self { context }
    }

    /// Blocks serving requests until the server stops.
    pub fn run(self) -> Result<(), RunError> {
        let RunContext {
            config,
            project_id,
            http_client,
        } = self.context;

        info!(
            %project_id,
            stop_instances = config.actions.stop_instances,
            disable_billing = config.actions.disable_billing,
            "budget guard ready"
        );
        let handler = Arc::new(build_handler(&config, project_id, http_client));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(RunError::Runtime)?;
        let result = runtime.block_on(run_server(config.server, handler.clone()));

        // The blocking HTTP client cannot be dropped from within the runtime.
        drop(runtime);
        drop(handler);

        result.map_err(RunError::Server)
    }
}

/// Builds the handler backed by the real Compute Engine and Cloud Billing clients.
pub fn build_handler<C>(
    config: &GuardConfig,
    project_id: ProjectId,
    http_client: Arc<C>,
) -> GuardHandler<C>
where
    C: HttpClient + Send + Sync + 'static,
{
    let token_retriever: Arc<dyn TokenRetriever + Send + Sync> =
        match config.auth.access_token.clone() {
            Some(token) => {
                debug!("using the configured static access token");
                Arc::new(StaticTokenRetriever::new(token))
            }
            None => Arc::new(MetadataTokenRetriever::new(
                http_client.clone(),
                &config.auth.metadata_endpoint,
            )),
        };

    let compute = ComputeClient::new(
        ApiClient::new(http_client.clone(), token_retriever.clone()),
        config.compute.clone(),
    );
    let billing = BillingClient::new(
        ApiClient::new(http_client, token_retriever),
        config.billing.clone(),
    );

    BudgetEventHandler::new(Remediator::new(
        compute,
        billing,
        project_id,
        config.actions.clone(),
    ))
}
