//! Entry point of the budget guard webhook.
//!
//! Parses the command line arguments and either prints the binary information or serves
//! budget notifications until the process is stopped.
#![warn(missing_docs)]
use gcp_budget_guard::command::Command;
use gcp_budget_guard::http::client::ReqwestHttpClient;
use gcp_budget_guard::run::{GuardRunner, RunContext};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    Command::run(_main)
}

/// This is the actual main function.
///
/// It is separated from [main] so errors are propagated and logged once, in string format.
fn _main(run_context: RunContext<ReqwestHttpClient>) -> Result<(), Box<dyn Error>> {
    GuardRunner::new(run_context).run()?;
    Ok(())
}
