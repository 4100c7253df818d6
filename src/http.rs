//! Blocking HTTP client used to talk to the Google Cloud APIs.
pub mod client;
pub mod config;
pub mod reqwest;
