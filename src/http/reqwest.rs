//! # Helpers to build a reqwest blocking client and handle its responses
use super::config::HttpConfig;
use reqwest::blocking::{Client, ClientBuilder, Response};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ReqwestResponseError {
    #[error("could not read response body: {0}")]
    ReadingResponse(String),
    #[error("could not build response: {0}")]
    BuildingResponse(String),
}

/// Helper to build a [http::Response<Vec<u8>>] from a reqwest's blocking response.
/// It includes status, version and body. Headers are not included since no caller needs them.
pub fn try_build_response(res: Response) -> Result<http::Response<Vec<u8>>, ReqwestResponseError> {
    let status = res.status();
    let version = res.version();
    let body: Vec<u8> = res
        .bytes()
        .map_err(|err| ReqwestResponseError::ReadingResponse(err.to_string()))?
        .into();
    http::Response::builder()
        .status(status)
        .version(version)
        .body(body)
        .map_err(|err| ReqwestResponseError::BuildingResponse(err.to_string()))
}

#[derive(thiserror::Error, Debug)]
pub enum ReqwestBuildError {
    #[error("could not build the reqwest client: {0}")]
    ClientBuilder(String),
}

/// Builds a reqwest blocking client according to the provided configuration.
pub fn try_build_reqwest_client(config: &HttpConfig) -> Result<Client, ReqwestBuildError> {
    reqwest_builder_with_timeout(config.timeout, config.conn_timeout)
        .build()
        .map_err(|err| ReqwestBuildError::ClientBuilder(err.to_string()))
}

/// Returns a reqwest [ClientBuilder] using rustls with the system certificates and the provided timeouts.
pub fn reqwest_builder_with_timeout(timeout: Duration, conn_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .use_rustls_tls()
        .tls_built_in_native_certs(true)
        .timeout(timeout)
        .connect_timeout(conn_timeout)
}
