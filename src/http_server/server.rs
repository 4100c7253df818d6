use super::config::ServerConfig;
use super::webhook_handler::webhook_handler;
use crate::gcp::billing::BillingApi;
use crate::gcp::compute::ComputeApi;
use crate::handler::BudgetEventHandler;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

/// Serves `POST /` until the process receives a termination signal.
pub async fn run_server<C, B>(
    server_config: ServerConfig,
    handler: Arc<BudgetEventHandler<C, B>>,
) -> std::io::Result<()>
where
    C: ComputeApi + Send + Sync + 'static,
    B: BillingApi + Send + Sync + 'static,
{
    info!(
        "starting HTTP server at http://{}:{}",
        server_config.host, server_config.port
    );

    let handler_data = web::Data::new(handler);

    HttpServer::new(move || {
        App::new()
            .app_data(handler_data.clone())
            .service(web::resource("/").route(web::post().to(webhook_handler::<C, B>)))
    })
    .bind((server_config.host.to_string(), server_config.port.into()))?
    .workers(server_config.workers)
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
