use super::{RemediationError, Remediator};
use crate::gcp::billing::{BillingApi, ProjectBillingInfo};
use crate::gcp::compute::ComputeApi;
use std::fmt::Display;
use tracing::info;

#[derive(Debug, PartialEq, Clone)]
pub enum BillingChange {
    /// Billing was enabled and the project got detached from this billing account.
    Disabled { billing_account_name: String },
    AlreadyDisabled,
}

impl Display for BillingChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled {
                billing_account_name,
            } => write!(
                f,
                "project billing disabled, detached from `{billing_account_name}`"
            ),
            Self::AlreadyDisabled => write!(f, "project billing is already disabled"),
        }
    }
}

impl<C, B> Remediator<C, B>
where
    C: ComputeApi,
    B: BillingApi,
{
    /// Detaches the project from its billing account if billing is enabled.
    /// Running it again once billing is disabled performs no update.
    pub fn disable_billing(&self) -> Result<BillingChange, RemediationError> {
        let project = self.project_id.as_str();
        info!(project_id = project, "checking billing status");

        let current = self
            .billing
            .get_billing_info(project)
            .map_err(RemediationError::GetBillingInfo)?;

        if !current.billing_enabled {
            return Ok(BillingChange::AlreadyDisabled);
        }

        info!(project_id = project, "disabling billing for the project");
        self.billing
            .update_billing_info(project, &ProjectBillingInfo::disabled())
            .map_err(RemediationError::UpdateBillingInfo)?;

        Ok(BillingChange::Disabled {
            billing_account_name: current.billing_account_name,
        })
    }
}
