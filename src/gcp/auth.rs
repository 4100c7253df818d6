//! OAuth2 access tokens for the Google Cloud APIs.
use super::project::DEFAULT_METADATA_ENDPOINT;
use super::{METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE};
use crate::http::client::{HttpClient, HttpClientError};
use http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Path of the default service account token, relative to the metadata server endpoint.
const TOKEN_PATH: &str = "instance/service-accounts/default/token";

/// Where credentials come from. A static `access_token` skips the metadata server for tokens,
/// which allows running outside of Google Cloud.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
    #[serde(default)]
    pub access_token: Option<AccessToken>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            metadata_endpoint: default_metadata_endpoint(),
            access_token: None,
        }
    }
}

fn default_metadata_endpoint() -> String {
    DEFAULT_METADATA_ENDPOINT.to_string()
}

#[derive(Error, Debug)]
pub enum TokenRetrieverError {
    #[error("requesting token: {0}")]
    HttpError(#[from] HttpClientError),
    #[error("token request failed with status `{0}`: {1}")]
    UnsuccessfulResponse(u16, String),
    #[error("decoding token response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token is empty")]
    EmptyToken,
    #[error("token is not a valid header value")]
    InvalidToken,
}

/// Bearer token sent on every API call. The value is never printed.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the `Authorization` header value for this token, marked as sensitive.
    pub fn header_value(&self) -> Result<HeaderValue, TokenRetrieverError> {
        let mut value = HeaderValue::from_str(format!("Bearer {}", self.0).as_str())
            .map_err(|_| TokenRetrieverError::InvalidToken)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

/// Anything able to provide an access token for the cloud APIs.
#[cfg_attr(test, mockall::automock)]
pub trait TokenRetriever {
    fn retrieve(&self) -> Result<AccessToken, TokenRetrieverError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: AccessToken,
}

/// Retrieves the token of the default service account from the GCP metadata server.
pub struct MetadataTokenRetriever<C: HttpClient> {
    http_client: Arc<C>,
    token_url: String,
}

impl<C: HttpClient> MetadataTokenRetriever<C> {
    pub fn new(http_client: Arc<C>, metadata_endpoint: &str) -> Self {
        Self {
            http_client,
            token_url: format!("{}/{TOKEN_PATH}", metadata_endpoint.trim_end_matches('/')),
        }
    }
}

impl<C: HttpClient> TokenRetriever for MetadataTokenRetriever<C> {
    fn retrieve(&self) -> Result<AccessToken, TokenRetrieverError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            METADATA_FLAVOR_HEADER,
            HeaderValue::from_static(METADATA_FLAVOR_VALUE),
        );
        debug!(url = %self.token_url, "requesting access token from metadata server");
        let response = self.http_client.get(&self.token_url, headers)?;

        if !response.status().is_success() {
            return Err(TokenRetrieverError::UnsuccessfulResponse(
                response.status().as_u16(),
                String::from_utf8_lossy(response.body()).to_string(),
            ));
        }

        let token: TokenResponse = serde_json::from_slice(response.body())?;
        if token.access_token.0.is_empty() {
            return Err(TokenRetrieverError::EmptyToken);
        }
        Ok(token.access_token)
    }
}

/// Always returns the token it was built with. Useful when running outside GCP.
pub struct StaticTokenRetriever(AccessToken);

impl StaticTokenRetriever {
    pub fn new(token: AccessToken) -> Self {
        Self(token)
    }
}

impl TokenRetriever for StaticTokenRetriever {
    fn retrieve(&self) -> Result<AccessToken, TokenRetrieverError> {
        Ok(self.0.clone())
    }
}
