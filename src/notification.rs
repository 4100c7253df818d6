//! Inbound Pub/Sub push notifications carrying budget alerts.
mod budget_alert;
mod envelope;

pub use budget_alert::BudgetAlert;
pub use envelope::{DecodeError, PubSubMessage, PushEnvelope, ValidationError};
