use crate::gcp::billing::BillingApi;
use crate::gcp::compute::ComputeApi;
use crate::handler::{BudgetEventHandler, HandlerResponse};
use actix_web::http::header::ContentType;
use actix_web::web::{self, Bytes, Data};
use actix_web::HttpResponse;
use std::sync::Arc;
use tracing::error;

/// Runs the blocking handler on the blocking thread pool.
pub(super) async fn webhook_handler<C, B>(
    handler: Data<Arc<BudgetEventHandler<C, B>>>,
    body: Bytes,
) -> HttpResponse
where
    C: ComputeApi + Send + Sync + 'static,
    B: BillingApi + Send + Sync + 'static,
{
    let handler: Arc<BudgetEventHandler<C, B>> = Arc::clone(&handler);
    let response = match web::block(move || handler.handle(&body)).await {
        Ok(response) => response,
        Err(err) => {
            error!(error_msg = %err, "budget notification handling was interrupted");
            HandlerResponse::Accepted
        }
    };

    match response {
        HandlerResponse::Accepted => HttpResponse::Ok(),
        HandlerResponse::InvalidRequest => HttpResponse::BadRequest(),
    }
    .content_type(ContentType::plaintext())
    .body(response.status_line())
}
