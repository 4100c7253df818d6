use super::config::HttpConfig;
use super::reqwest::{try_build_reqwest_client, try_build_response, ReqwestBuildError};
use http::{HeaderMap, Request, Response};
use reqwest::blocking::Client;
use thiserror::Error;

/// An enumeration of potential errors related to the HTTP client.
#[derive(Error, Debug)]
pub enum HttpClientError {
    /// Represents an error building the request
    #[error("could not build the HTTP request: `{0}`")]
    BuildingError(String),
    /// Represents HTTP Transport error.
    #[error("transport HTTP client error: `{0}`")]
    TransportError(String),
    /// Represents an error reading the HTTP response.
    #[error("invalid HTTP response: `{0}`")]
    InvalidResponse(String),
}

/// The `HttpClient` trait defines the HTTP send interface to be implemented
/// by HTTP clients.
pub trait HttpClient {
    /// Returns a `http::Response<Vec<u8>>` structure as the HTTP response or
    /// HttpClientError if an error was found.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>;

    /// Performs a get request with the provided url and headers.
    fn get(&self, url: &str, headers: HeaderMap) -> Result<Response<Vec<u8>>, HttpClientError> {
        self.send(build_request("GET", url, headers, Vec::new())?)
    }

    /// Performs a request carrying a JSON body with the provided method, url and headers.
    fn send_json(
        &self,
        method: &str,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<Response<Vec<u8>>, HttpClientError> {
        let mut request = build_request(method, url, headers, body)?;
        request.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        self.send(request)
    }
}

fn build_request(
    method: &str,
    url: &str,
    headers: HeaderMap,
    body: Vec<u8>,
) -> Result<Request<Vec<u8>>, HttpClientError> {
    let mut request = Request::builder()
        .method(method)
        .uri(url)
        .body(body)
        .map_err(|e| HttpClientError::BuildingError(e.to_string()))?;
    request.headers_mut().extend(headers);
    Ok(request)
}

/// An implementation of the `HttpClient` trait using the reqwest blocking client.
///
/// Requests must not be sent from within an async context, see [reqwest::blocking].
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn try_new(config: &HttpConfig) -> Result<Self, ReqwestBuildError> {
        Ok(Self {
            client: try_build_reqwest_client(config)?,
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        let request = reqwest::blocking::Request::try_from(request)
            .map_err(|e| HttpClientError::BuildingError(e.to_string()))?;
        let response = self
            .client
            .execute(request)
            .map_err(|e| HttpClientError::TransportError(e.to_string()))?;
        try_build_response(response).map_err(|e| HttpClientError::InvalidResponse(e.to_string()))
    }
}
