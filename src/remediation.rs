//! Actions taken against the project once a budget alert is accepted.
//!
//! Each action runs inside a single failure boundary: the first backend error stops the action
//! and is reported as [ActionOutcome::Failed]. Failures never propagate further, so the
//! notification is always acknowledged.
use crate::config::ProjectId;
use crate::gcp::api::GcpApiError;
use crate::gcp::billing::BillingApi;
use crate::gcp::compute::ComputeApi;
use crate::notification::BudgetAlert;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod disable_billing;
mod outcome;
mod stop_instances;

pub use disable_billing::BillingChange;
pub use outcome::{ActionOutcome, RemediationReport};
pub use stop_instances::StoppedInstance;

#[derive(Error, Debug)]
pub enum RemediationError {
    #[error("listing zones: {0}")]
    ListZones(#[source] GcpApiError),
    #[error("listing instances in zone `{zone}`: {source}")]
    ListInstances { zone: String, source: GcpApiError },
    #[error("stopping instance `{instance}` in zone `{zone}`: {source}")]
    StopInstance {
        zone: String,
        instance: String,
        source: GcpApiError,
    },
    #[error("getting billing info: {0}")]
    GetBillingInfo(#[source] GcpApiError),
    #[error("updating billing info: {0}")]
    UpdateBillingInfo(#[source] GcpApiError),
}

/// Which actions run for an accepted alert.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ActionsConfig {
    #[serde(default)]
    pub stop_instances: bool,
    #[serde(default = "default_disable_billing")]
    pub disable_billing: bool,
    /// When set, alerts whose cost is below this fraction of the budget are ignored.
    #[serde(default)]
    pub min_cost_ratio: Option<f64>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            stop_instances: false,
            disable_billing: default_disable_billing(),
            min_cost_ratio: None,
        }
    }
}

fn default_disable_billing() -> bool {
    true
}

impl ActionsConfig {
    /// Returns why remediation must not run for this alert, if the cost gate is enabled and
    /// the alert reports a cost below it. Unknown costs never block remediation.
    pub fn gate(&self, alert: Option<&BudgetAlert>) -> Option<String> {
        let min_ratio = self.min_cost_ratio?;
        let ratio = alert?.cost_ratio()?;
        (ratio < min_ratio)
            .then(|| format!("cost ratio {ratio:.4} is below the configured {min_ratio}"))
    }
}

/// Runs the configured actions for a single project.
pub struct Remediator<C, B>
where
    C: ComputeApi,
    B: BillingApi,
{
    compute: C,
    billing: B,
    project_id: ProjectId,
    actions: ActionsConfig,
}

impl<C, B> Remediator<C, B>
where
    C: ComputeApi,
    B: BillingApi,
{
    pub fn new(compute: C, billing: B, project_id: ProjectId, actions: ActionsConfig) -> Self {
        Self {
            compute,
            billing,
            project_id,
            actions,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn actions(&self) -> &ActionsConfig {
        &self.actions
    }

    /// Runs every enabled action, stopping instances first.
    pub fn run(&self) -> RemediationReport {
        let stop_instances = if self.actions.stop_instances {
            self.stop_running_instances().into()
        } else {
            ActionOutcome::Skipped("disabled".to_string())
        };
        let disable_billing = if self.actions.disable_billing {
            self.disable_billing().into()
        } else {
            ActionOutcome::Skipped("disabled".to_string())
        };
        RemediationReport {
            stop_instances,
            disable_billing,
        }
    }

    /// Report with every action skipped for the given reason.
    pub fn skip(&self, reason: &str) -> RemediationReport {
        RemediationReport {
            stop_instances: ActionOutcome::Skipped(reason.to_string()),
            disable_billing: ActionOutcome::Skipped(reason.to_string()),
        }
    }
}
