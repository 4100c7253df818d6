//! Turns an inbound push request into remediation.
use crate::gcp::billing::BillingApi;
use crate::gcp::compute::ComputeApi;
use crate::notification::{BudgetAlert, PushEnvelope};
use crate::remediation::Remediator;
use tracing::{debug, info, warn};

/// What the webhook answers. Remediation failures are never reflected here.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum HandlerResponse {
    Accepted,
    InvalidRequest,
}

impl HandlerResponse {
    pub fn status_line(&self) -> &'static str {
        match self {
            Self::Accepted => "OK",
            Self::InvalidRequest => "Invalid request",
        }
    }

    pub fn http_code(&self) -> u16 {
        match self {
            Self::Accepted => 200,
            Self::InvalidRequest => 400,
        }
    }
}

pub struct BudgetEventHandler<C, B>
where
    C: ComputeApi,
    B: BillingApi,
{
    remediator: Remediator<C, B>,
}

impl<C, B> BudgetEventHandler<C, B>
where
    C: ComputeApi,
    B: BillingApi,
{
    pub fn new(remediator: Remediator<C, B>) -> Self {
        Self { remediator }
    }

    /// Validates the envelope and, once valid, runs the enabled actions in order.
    pub fn handle(&self, body: &[u8]) -> HandlerResponse {
        let envelope = match PushEnvelope::try_from_slice(body) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error_msg = %err, "rejecting invalid request");
                return HandlerResponse::InvalidRequest;
            }
        };

        let project_id = self.remediator.project_id();
        info!(
            %project_id,
            message_id = envelope.message.message_id.as_deref().unwrap_or_default(),
            "received budget notification"
        );

        let alert = match envelope.message.decode_data() {
            Ok(payload) => {
                info!("Received Pub/Sub message: {payload}");
                BudgetAlert::parse(&payload)
            }
            Err(err) => {
                warn!(error_msg = %err, "could not decode message data");
                None
            }
        };
        match &alert {
            Some(alert) => info!(
                budget = alert.budget_display_name.as_deref().unwrap_or_default(),
                cost = alert.cost_amount,
                budget_amount = alert.budget_amount,
                currency = alert.currency_code.as_deref().unwrap_or_default(),
                "budget alert"
            ),
            None => debug!("payload is not a budget alert"),
        }

        let report = match self.remediator.actions().gate(alert.as_ref()) {
            Some(reason) => self.remediator.skip(&reason),
            None => self.remediator.run(),
        };
        report.log();

        HandlerResponse::Accepted
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gcp::api::GcpApiError;
    use crate::gcp::billing::{MockBillingApi, ProjectBillingInfo};
    use crate::gcp::compute::MockComputeApi;
    use crate::remediation::tests::remediator;
    use crate::remediation::ActionsConfig;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use rstest::rstest;
    use tracing_test::traced_test;

    pub fn envelope(payload: &str) -> Vec<u8> {
        serde_json::json!({
            "message": {
                "data": STANDARD.encode(payload),
                "messageId": "1234",
            },
            "subscription": "projects/my-project/subscriptions/budget-alerts",
        })
        .to_string()
        .into_bytes()
    }

    fn budget_alert(cost: f64, budget: f64) -> String {
        serde_json::json!({
            "budgetDisplayName": "monthly-cap",
            "costAmount": cost,
            "budgetAmount": budget,
            "currencyCode": "USD",
        })
        .to_string()
    }

    #[rstest]
    #[case::not_json(b"hello".as_slice())]
    #[case::empty_body(b"".as_slice())]
    #[case::empty_object(br#"{}"#.as_slice())]
    #[case::missing_data(br#"{"message": {"messageId": "1"}}"#.as_slice())]
    #[case::null_data(br#"{"message": {"data": null}}"#.as_slice())]
    fn test_invalid_request_calls_no_backend(#[case] body: &[u8]) {
        // Mocks without expectations panic on any call.
        let handler = BudgetEventHandler::new(remediator(
            MockComputeApi::new(),
            MockBillingApi::new(),
            ActionsConfig {
                stop_instances: true,
                disable_billing: true,
                min_cost_ratio: None,
            },
        ));

        let response = handler.handle(body);

        assert_eq!(response, HandlerResponse::InvalidRequest);
        assert_eq!(response.http_code(), 400);
        assert_eq!(response.status_line(), "Invalid request");
    }

    #[test]
    fn test_accepted_even_if_every_backend_fails() {
        let mut compute = MockComputeApi::new();
        compute.expect_list_zones().once().returning(|_| {
            Err(GcpApiError::UnsuccessfulResponse {
                status: 500,
                message: "internal".to_string(),
            })
        });
        let mut billing = MockBillingApi::new();
        billing.expect_get_billing_info().once().returning(|_| {
            Err(GcpApiError::UnsuccessfulResponse {
                status: 500,
                message: "internal".to_string(),
            })
        });
        let handler = BudgetEventHandler::new(remediator(
            compute,
            billing,
            ActionsConfig {
                stop_instances: true,
                ..Default::default()
            },
        ));

        let response = handler.handle(&envelope("hello"));

        assert_eq!(response, HandlerResponse::Accepted);
        assert_eq!(response.http_code(), 200);
        assert_eq!(response.status_line(), "OK");
    }

    #[traced_test]
    #[test]
    fn test_payload_is_logged_verbatim() {
        let mut billing = MockBillingApi::new();
        billing
            .expect_get_billing_info()
            .once()
            .returning(|_| Ok(ProjectBillingInfo::disabled()));
        let handler = BudgetEventHandler::new(remediator(
            MockComputeApi::new(),
            billing,
            ActionsConfig::default(),
        ));

        let response = handler.handle(br#"{"message": {"data": "aGVsbG8="}}"#);

        assert_eq!(response, HandlerResponse::Accepted);
        assert!(logs_contain("Received Pub/Sub message: hello"));
    }

    #[rstest]
    #[case::empty_data(br#"{"message": {"data": ""}}"#.as_slice())]
    #[case::null_attributes(br#"{"message": {"data": "aGVsbG8=", "attributes": null}}"#.as_slice())]
    #[case::numeric_message_id(br#"{"message": {"data": "aGVsbG8=", "messageId": 123}}"#.as_slice())]
    #[case::numeric_subscription(br#"{"message": {"data": "aGVsbG8="}, "subscription": 5}"#.as_slice())]
    fn test_minimal_envelope_runs_actions(#[case] body: &[u8]) {
        let mut compute = MockComputeApi::new();
        compute
            .expect_list_zones()
            .once()
            .returning(|_| Ok(Vec::new()));
        let mut billing = MockBillingApi::new();
        billing
            .expect_get_billing_info()
            .once()
            .returning(|_| Ok(ProjectBillingInfo::disabled()));
        let handler = BudgetEventHandler::new(remediator(
            compute,
            billing,
            ActionsConfig {
                stop_instances: true,
                disable_billing: true,
                min_cost_ratio: None,
            },
        ));

        let response = handler.handle(body);

        assert_eq!(response, HandlerResponse::Accepted);
    }

    #[traced_test]
    #[test]
    fn test_undecodable_data_still_runs_actions() {
        let mut billing = MockBillingApi::new();
        billing
            .expect_get_billing_info()
            .once()
            .returning(|_| Ok(ProjectBillingInfo::disabled()));
        let handler = BudgetEventHandler::new(remediator(
            MockComputeApi::new(),
            billing,
            ActionsConfig::default(),
        ));

        let response = handler.handle(br#"{"message": {"data": "%%% not base64 %%%"}}"#);

        assert_eq!(response, HandlerResponse::Accepted);
        assert!(logs_contain("could not decode message data"));
    }

    #[test]
    fn test_alert_below_cost_ratio_runs_no_action() {
        let handler = BudgetEventHandler::new(remediator(
            MockComputeApi::new(),
            MockBillingApi::new(),
            ActionsConfig {
                stop_instances: true,
                disable_billing: true,
                min_cost_ratio: Some(0.99),
            },
        ));

        let response = handler.handle(&envelope(&budget_alert(50.0, 100.0)));

        assert_eq!(response, HandlerResponse::Accepted);
    }

    #[test]
    fn test_alert_reaching_cost_ratio_runs_actions() {
        let mut compute = MockComputeApi::new();
        compute
            .expect_list_zones()
            .once()
            .returning(|_| Ok(Vec::new()));
        let mut billing = MockBillingApi::new();
        billing
            .expect_get_billing_info()
            .once()
            .returning(|_| Ok(ProjectBillingInfo::disabled()));
        let handler = BudgetEventHandler::new(remediator(
            compute,
            billing,
            ActionsConfig {
                stop_instances: true,
                disable_billing: true,
                min_cost_ratio: Some(0.99),
            },
        ));

        let response = handler.handle(&envelope(&budget_alert(100.0, 100.0)));

        assert_eq!(response, HandlerResponse::Accepted);
    }
}
