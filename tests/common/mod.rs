#![allow(dead_code)]
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gcp_budget_guard::config::{GuardConfig, ProjectId};
use gcp_budget_guard::http::client::ReqwestHttpClient;
use gcp_budget_guard::run::{GuardRunner, RunContext};
use httpmock::MockServer;
use std::error::Error;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

pub const PROJECT: &str = "my-project";

/// Retries the execution of `f` after the `interval` has elapsed, until `max_attempts` is reached.
/// # Panics
/// When executing `f` keeps failing after reaching `max_attempts`.
pub fn retry<F>(max_attempts: usize, interval: Duration, mut f: F)
where
    F: FnMut() -> Result<(), Box<dyn Error>>,
{
    let mut last_err = Ok(());
    for _ in 0..max_attempts {
        let Err(err) = f() else {
            return;
        };
        last_err = Err(err);
        std::thread::sleep(interval);
    }
    last_err.unwrap_or_else(|err| panic!("retry failed after {max_attempts} attempts: {err}"))
}

/// Config with every cloud endpoint pointing to `backend`.
pub fn config_for(backend: &MockServer, extra_yaml: &str) -> GuardConfig {
    let port = free_port();
    let yaml = format!(
        r#"
server:
  host: 127.0.0.1
  port: {port}
compute:
  endpoint: {compute}
  operation_wait_attempts: 2
billing:
  endpoint: {billing}
auth:
  metadata_endpoint: {metadata}
{extra_yaml}
"#,
        compute = backend.url("/compute/v1"),
        billing = backend.url("/billing/v1"),
        metadata = backend.url("/computeMetadata/v1"),
    );
    serde_yaml::from_str(&yaml).unwrap()
}

/// Starts the guard in a background thread and waits until it accepts connections.
/// Returns the URL of the webhook.
pub fn start_guard(config: GuardConfig) -> String {
    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .unwrap();
    let http_client = Arc::new(ReqwestHttpClient::try_new(&config.http).unwrap());
    let context = RunContext {
        config,
        project_id: ProjectId::from(PROJECT),
        http_client,
    };

    std::thread::spawn(move || GuardRunner::new(context).run());

    retry(50, Duration::from_millis(100), || {
        TcpStream::connect(address)?;
        Ok(())
    });
    format!("http://{address}/")
}

pub fn push_request(payload: &str) -> String {
    serde_json::json!({
        "message": {
            "data": STANDARD.encode(payload),
            "messageId": "2070443601311540",
            "publishTime": "2024-05-01T10:00:00.000Z",
        },
        "subscription": "projects/my-project/subscriptions/budget-alerts",
    })
    .to_string()
}

pub fn post(url: &str, body: impl Into<String>) -> (u16, String) {
    let response = reqwest::blocking::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body.into())
        .send()
        .unwrap();
    let status = response.status().as_u16();
    (status, response.text().unwrap())
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
