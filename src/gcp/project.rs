//! Project id discovery through the GCP metadata server.
use super::{METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE};
use crate::http::client::{HttpClient, HttpClientError};
use http::{HeaderMap, HeaderValue};
use thiserror::Error;

pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal/computeMetadata/v1";
const PROJECT_ID_PATH: &str = "project/project-id";

#[derive(Error, Debug)]
pub enum ProjectIdError {
    #[error("`{0}`")]
    HttpError(#[from] HttpClientError),
    #[error("Status code: `{0}` Canonical reason: `{1}`")]
    UnsuccessfulResponse(u16, String),
    #[error("metadata server returned an empty project id")]
    Empty,
}

/// Asks the metadata server which project the workload is running in.
pub fn detect_project_id<C: HttpClient>(
    http_client: &C,
    metadata_endpoint: &str,
) -> Result<String, ProjectIdError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        METADATA_FLAVOR_HEADER,
        HeaderValue::from_static(METADATA_FLAVOR_VALUE),
    );
    let url = format!(
        "{}/{PROJECT_ID_PATH}",
        metadata_endpoint.trim_end_matches('/')
    );
    let response = http_client.get(&url, headers)?;

    // return error if status code is not within 200-299.
    if !response.status().is_success() {
        return Err(ProjectIdError::UnsuccessfulResponse(
            response.status().as_u16(),
            response
                .status()
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
        ));
    }

    let project_id = String::from_utf8_lossy(response.body()).trim().to_string();
    if project_id.is_empty() {
        return Err(ProjectIdError::Empty);
    }
    Ok(project_id)
}
