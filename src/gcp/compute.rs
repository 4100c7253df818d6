//! Compute Engine v1 client: zones, instances and the stop operation.
use super::api::{ApiClient, GcpApiError};
use crate::http::client::HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";
const DEFAULT_OPERATION_WAIT_ATTEMPTS: u32 = 10;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ComputeConfig {
    #[serde(default = "default_compute_endpoint")]
    pub endpoint: String,
    /// Each attempt blocks on the `wait` endpoint, which returns after at most two minutes.
    #[serde(default = "default_operation_wait_attempts")]
    pub operation_wait_attempts: u32,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_compute_endpoint(),
            operation_wait_attempts: DEFAULT_OPERATION_WAIT_ATTEMPTS,
        }
    }
}

fn default_compute_endpoint() -> String {
    DEFAULT_COMPUTE_ENDPOINT.to_string()
}

fn default_operation_wait_attempts() -> u32 {
    DEFAULT_OPERATION_WAIT_ATTEMPTS
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct Zone {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Stopped,
    Suspending,
    Suspended,
    Repairing,
    Terminated,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct Instance {
    pub name: Option<String>,
    #[serde(default)]
    pub status: InstanceStatus,
}

impl Instance {
    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationErrors {
    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Zonal operation returned by mutating calls such as `instances.stop`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub name: String,
    pub status: OperationStatus,
    pub error: Option<OperationErrors>,
}

impl Operation {
    fn error_message(&self) -> Option<String> {
        let errors = &self.error.as_ref()?.errors;
        if errors.is_empty() {
            return None;
        }
        Some(
            errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

/// Compute Engine operations used by the stop-instances remediation.
#[cfg_attr(test, mockall::automock)]
pub trait ComputeApi {
    /// Lists every zone available to the project.
    fn list_zones(&self, project: &str) -> Result<Vec<Zone>, GcpApiError>;
    /// Lists every instance of the project in the zone.
    fn list_instances(&self, project: &str, zone: &str) -> Result<Vec<Instance>, GcpApiError>;
    /// Stops the instance and blocks until the operation is done.
    fn stop_instance(&self, project: &str, zone: &str, instance: &str)
        -> Result<(), GcpApiError>;
}

pub struct ComputeClient<C: HttpClient> {
    api: ApiClient<C>,
    config: ComputeConfig,
}

impl<C: HttpClient> ComputeClient<C> {
    pub fn new(api: ApiClient<C>, config: ComputeConfig) -> Self {
        Self { api, config }
    }

    fn project_url(&self, project: &str, path: &str) -> String {
        format!(
            "{}/projects/{project}/{path}",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    /// Collects the items of every page, following `nextPageToken`.
    fn list_all<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, GcpApiError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page_url = match &page_token {
                Some(token) => Url::parse_with_params(url, [("pageToken", token)])
                    .map(String::from)
                    .unwrap_or_else(|_| format!("{url}?pageToken={token}")),
                None => url.to_string(),
            };
            let page: ListPage<T> = self.api.get(&page_url)?;
            items.extend(page.items);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }
    }

    fn wait_for_operation(
        &self,
        project: &str,
        zone: &str,
        mut operation: Operation,
    ) -> Result<(), GcpApiError> {
        let mut attempts = 0;
        while operation.status != OperationStatus::Done {
            if attempts == self.config.operation_wait_attempts {
                return Err(GcpApiError::OperationTimeout {
                    operation: operation.name,
                    attempts,
                });
            }
            attempts += 1;
            debug!(operation = %operation.name, attempts, "waiting for operation");
            let url = self.project_url(
                project,
                &format!("zones/{zone}/operations/{}/wait", operation.name),
            );
            operation = self.api.send("POST", &url, &serde_json::Map::new())?;
        }

        match operation.error_message() {
            Some(message) => Err(GcpApiError::OperationFailed {
                operation: operation.name,
                message,
            }),
            None => Ok(()),
        }
    }
}

impl<C: HttpClient> ComputeApi for ComputeClient<C> {
    fn list_zones(&self, project: &str) -> Result<Vec<Zone>, GcpApiError> {
        self.list_all(&self.project_url(project, "zones"))
    }

    fn list_instances(&self, project: &str, zone: &str) -> Result<Vec<Instance>, GcpApiError> {
        self.list_all(&self.project_url(project, &format!("zones/{zone}/instances")))
    }

    fn stop_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<(), GcpApiError> {
        let url = self.project_url(project, &format!("zones/{zone}/instances/{instance}/stop"));
        let operation: Operation = self.api.send("POST", &url, &serde_json::Map::new())?;
        self.wait_for_operation(project, zone, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::auth::StaticTokenRetriever;
    use crate::gcp::auth::AccessToken;
    use crate::http::client::ReqwestHttpClient;
    use crate::http::config::HttpConfig;
    use assert_matches::assert_matches;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use std::sync::Arc;

    fn compute_client(server: &MockServer, wait_attempts: u32) -> ComputeClient<ReqwestHttpClient> {
        let http_client = ReqwestHttpClient::try_new(&HttpConfig::default()).unwrap();
        let token_retriever = StaticTokenRetriever::new(AccessToken::new("token"));
        ComputeClient::new(
            ApiClient::new(Arc::new(http_client), Arc::new(token_retriever)),
            ComputeConfig {
                endpoint: server.url("/compute/v1"),
                operation_wait_attempts: wait_attempts,
            },
        )
    }

    #[test]
    fn test_list_zones_follows_pages() {
        let server = MockServer::start();
        let second_page = server.mock(|when, then| {
            when.method(GET)
                .path("/compute/v1/projects/my-project/zones")
                .query_param("pageToken", "next");
            then.status(200)
                .body(r#"{"items":[{"name":"z2"}]}"#);
        });
        let first_page = server.mock(|when, then| {
            when.method(GET)
                .path("/compute/v1/projects/my-project/zones")
                .header("authorization", "Bearer token")
                .matches(|req| req.query_params.as_ref().map_or(true, Vec::is_empty));
            then.status(200)
                .body(r#"{"items":[{"name":"z1"}],"nextPageToken":"next"}"#);
        });

        let zones = compute_client(&server, 1).list_zones("my-project").unwrap();

        first_page.assert();
        second_page.assert();
        let names: Vec<_> = zones.into_iter().filter_map(|z| z.name).collect();
        assert_eq!(names, vec!["z1", "z2"]);
    }

    #[test]
    fn test_list_instances_without_items() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/compute/v1/projects/my-project/zones/z1/instances");
            then.status(200).body(r#"{"id":"projects/my-project/zones/z1/instances"}"#);
        });

        let instances = compute_client(&server, 1)
            .list_instances("my-project", "z1")
            .unwrap();
        assert!(instances.is_empty());
    }

    #[test]
    fn test_list_instances_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/compute/v1/projects/my-project/zones/z1/instances");
            then.status(200).body(
                r#"{"items":[
                    {"name":"a","status":"RUNNING"},
                    {"name":"b","status":"TERMINATED"},
                    {"name":"c","status":"SOMETHING_NEW"}
                ]}"#,
            );
        });

        let instances = compute_client(&server, 1)
            .list_instances("my-project", "z1")
            .unwrap();
        let statuses: Vec<_> = instances.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                InstanceStatus::Running,
                InstanceStatus::Terminated,
                InstanceStatus::Unknown
            ]
        );
        assert!(instances[0].is_running());
    }

    #[test]
    fn test_stop_instance_waits_until_done() {
        let server = MockServer::start();
        let stop = server.mock(|when, then| {
            when.method(POST)
                .path("/compute/v1/projects/my-project/zones/z1/instances/a/stop");
            then.status(200)
                .body(r#"{"name":"operation-1","status":"RUNNING"}"#);
        });
        let wait = server.mock(|when, then| {
            when.method(POST)
                .path("/compute/v1/projects/my-project/zones/z1/operations/operation-1/wait");
            then.status(200)
                .body(r#"{"name":"operation-1","status":"DONE"}"#);
        });

        compute_client(&server, 3)
            .stop_instance("my-project", "z1", "a")
            .unwrap();

        stop.assert();
        wait.assert();
    }

    #[test]
    fn test_stop_instance_already_done_does_not_wait() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/compute/v1/projects/my-project/zones/z1/instances/a/stop");
            then.status(200)
                .body(r#"{"name":"operation-1","status":"DONE"}"#);
        });
        let wait = server.mock(|when, then| {
            when.method(POST).path_contains("/operations/");
            then.status(500);
        });

        compute_client(&server, 3)
            .stop_instance("my-project", "z1", "a")
            .unwrap();

        wait.assert_hits(0);
    }

    #[test]
    fn test_stop_instance_operation_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/compute/v1/projects/my-project/zones/z1/instances/a/stop");
            then.status(200).body(
                r#"{"name":"operation-1","status":"DONE","error":{"errors":[{"code":"RESOURCE_NOT_READY","message":"busy"}]}}"#,
            );
        });

        let err = compute_client(&server, 3)
            .stop_instance("my-project", "z1", "a")
            .unwrap_err();
        assert_matches!(err, GcpApiError::OperationFailed { operation, message } => {
            assert_eq!(operation, "operation-1");
            assert_eq!(message, "RESOURCE_NOT_READY: busy");
        });
    }

    #[test]
    fn test_stop_instance_operation_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/compute/v1/projects/my-project/zones/z1/instances/a/stop");
            then.status(200)
                .body(r#"{"name":"operation-1","status":"PENDING"}"#);
        });
        let wait = server.mock(|when, then| {
            when.method(POST)
                .path("/compute/v1/projects/my-project/zones/z1/operations/operation-1/wait");
            then.status(200)
                .body(r#"{"name":"operation-1","status":"RUNNING"}"#);
        });

        let err = compute_client(&server, 2)
            .stop_instance("my-project", "z1", "a")
            .unwrap_err();

        wait.assert_hits(2);
        assert_matches!(err, GcpApiError::OperationTimeout { attempts: 2, .. });
    }

    #[test]
    fn test_list_zones_permission_denied() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/compute/v1/projects/my-project/zones");
            then.status(403)
                .body(r#"{"error":{"code":403,"message":"denied"}}"#);
        });

        let err = compute_client(&server, 1)
            .list_zones("my-project")
            .unwrap_err();
        assert_matches!(err, GcpApiError::UnsuccessfulResponse { status: 403, .. });
    }
}
