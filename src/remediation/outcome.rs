use super::{BillingChange, RemediationError, StoppedInstance};
use tracing::{error, info, warn};

/// Result of a single remediation action.
#[derive(Debug)]
pub enum ActionOutcome<T> {
    Completed(T),
    /// The action did not run. Holds the reason.
    Skipped(String),
    Failed(RemediationError),
}

impl<T> From<Result<T, RemediationError>> for ActionOutcome<T> {
    fn from(result: Result<T, RemediationError>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => Self::Failed(err),
        }
    }
}

impl<T> ActionOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn log(&self, action: &str, describe: impl FnOnce(&T) -> String) {
        match self {
            Self::Completed(value) => info!(action, "{}", describe(value)),
            Self::Skipped(reason) => info!(action, "skipped: {reason}"),
            Self::Failed(err) => error!(action, error_msg = %err, "remediation action failed"),
        }
    }
}

/// Outcomes of every action run for one notification.
#[derive(Debug)]
pub struct RemediationReport {
    pub stop_instances: ActionOutcome<Vec<StoppedInstance>>,
    pub disable_billing: ActionOutcome<BillingChange>,
}

impl RemediationReport {
    /// Logs each outcome. Logs are the only place remediation failures show up.
    pub fn log(&self) {
        self.stop_instances.log("stop_instances", |stopped| {
            if stopped.is_empty() {
                return "no running instances found".to_string();
            }
            let names: Vec<String> = stopped.iter().map(ToString::to_string).collect();
            format!("stopped {} instance(s): {}", names.len(), names.join(", "))
        });
        self.disable_billing
            .log("disable_billing", ToString::to_string);
        if self.has_failures() {
            warn!("budget notification handled with failed remediation actions");
        }
    }

    pub fn has_failures(&self) -> bool {
        self.stop_instances.is_failed() || self.disable_billing.is_failed()
    }
}
