//! # GCP Budget Guard
//!
//! Webhook receiving Cloud Billing budget alerts through a Pub/Sub push subscription.
//! Every valid notification stops the running Compute Engine instances and detaches the
//! project from its billing account, depending on which actions are enabled.

pub mod command;
pub mod config;
pub mod gcp;
pub mod handler;
pub mod http;
pub mod http_server;
pub mod logging;
pub mod notification;
pub mod remediation;
pub mod run;
pub mod utils;
