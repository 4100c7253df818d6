use serde::Deserialize;

/// Programmatic budget notification published by Cloud Billing.
///
/// <https://cloud.google.com/billing/docs/how-to/budgets-programmatic-notifications#notification_format>
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    #[serde(default)]
    pub budget_display_name: Option<String>,
    pub cost_amount: f64,
    pub budget_amount: f64,
    #[serde(default)]
    pub alert_threshold_exceeded: Option<f64>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub cost_interval_start: Option<String>,
}

impl BudgetAlert {
    /// Best-effort parsing of a decoded payload; anything else yields `None`.
    pub fn parse(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }

    /// Spent fraction of the budget, `None` when the budget amount is not positive.
    pub fn cost_ratio(&self) -> Option<f64> {
        (self.budget_amount > 0.0).then(|| self.cost_amount / self.budget_amount)
    }
}
