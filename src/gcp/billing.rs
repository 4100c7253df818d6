//! Cloud Billing v1 client: project billing info.
use super::api::{ApiClient, GcpApiError};
use crate::http::client::HttpClient;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BILLING_ENDPOINT: &str = "https://cloudbilling.googleapis.com/v1";

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BillingConfig {
    #[serde(default = "default_billing_endpoint")]
    pub endpoint: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_billing_endpoint(),
        }
    }
}

fn default_billing_endpoint() -> String {
    DEFAULT_BILLING_ENDPOINT.to_string()
}

/// Billing state of a project. An empty `billing_account_name` means billing is disabled.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBillingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub billing_account_name: String,
    #[serde(default)]
    pub billing_enabled: bool,
}

impl ProjectBillingInfo {
    /// Billing info that detaches the project from its billing account.
    pub fn disabled() -> Self {
        Self::default()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait BillingApi {
    fn get_billing_info(&self, project: &str) -> Result<ProjectBillingInfo, GcpApiError>;
    fn update_billing_info(
        &self,
        project: &str,
        info: &ProjectBillingInfo,
    ) -> Result<ProjectBillingInfo, GcpApiError>;
}

pub struct BillingClient<C: HttpClient> {
    api: ApiClient<C>,
    config: BillingConfig,
}

impl<C: HttpClient> BillingClient<C> {
    pub fn new(api: ApiClient<C>, config: BillingConfig) -> Self {
        Self { api, config }
    }

    fn billing_info_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{project}/billingInfo",
            self.config.endpoint.trim_end_matches('/')
        )
    }
}

impl<C: HttpClient> BillingApi for BillingClient<C> {
    fn get_billing_info(&self, project: &str) -> Result<ProjectBillingInfo, GcpApiError> {
        self.api.get(&self.billing_info_url(project))
    }

    fn update_billing_info(
        &self,
        project: &str,
        info: &ProjectBillingInfo,
    ) -> Result<ProjectBillingInfo, GcpApiError> {
        self.api.send("PUT", &self.billing_info_url(project), info)
    }
}
