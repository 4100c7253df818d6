//! Authenticated JSON requests shared by the Compute Engine and Cloud Billing clients.
use super::auth::{TokenRetriever, TokenRetrieverError};
use crate::http::client::{HttpClient, HttpClientError};
use http::header::AUTHORIZATION;
use http::{HeaderMap, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by any cloud API call.
#[derive(Error, Debug)]
pub enum GcpApiError {
    #[error("could not get access token: {0}")]
    Token(#[from] TokenRetrieverError),
    #[error("`{0}`")]
    Http(#[from] HttpClientError),
    #[error("status code: `{status}`, reason: `{message}`")]
    UnsuccessfulResponse { status: u16, message: String },
    #[error("decoding response: `{0}`")]
    Json(#[from] serde_json::Error),
    #[error("operation `{operation}` failed: {message}")]
    OperationFailed { operation: String, message: String },
    #[error("operation `{operation}` not done after {attempts} wait attempts")]
    OperationTimeout { operation: String, attempts: u32 },
}

/// Error body returned by Google APIs, e.g. `{"error": {"code": 403, "message": "..."}}`.
#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Wraps an [HttpClient] adding the bearer token and JSON handling every call needs.
pub struct ApiClient<C: HttpClient> {
    http_client: Arc<C>,
    token_retriever: Arc<dyn TokenRetriever + Send + Sync>,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(http_client: Arc<C>, token_retriever: Arc<dyn TokenRetriever + Send + Sync>) -> Self {
        Self {
            http_client,
            token_retriever,
        }
    }

    fn headers(&self) -> Result<HeaderMap, GcpApiError> {
        let token = self.token_retriever.retrieve()?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token.header_value()?);
        Ok(headers)
    }

    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, GcpApiError> {
        let response = self.http_client.get(url, self.headers()?)?;
        decode(response)
    }

    pub fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        body: &B,
    ) -> Result<T, GcpApiError> {
        let body = serde_json::to_vec(body)?;
        let response = self
            .http_client
            .send_json(method, url, self.headers()?, body)?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response<Vec<u8>>) -> Result<T, GcpApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(response.body())
            .map(|err| err.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string()
            });
        return Err(GcpApiError::UnsuccessfulResponse {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(response.body())?)
}
