//! HTTP endpoint receiving the push requests.
pub mod config;
pub mod server;
mod webhook_handler;

pub use server::run_server;
