//! Architect: run a project target from the workspace configuration.
//!
//! This is the main entry point for the `architect` CLI. It parses
//! arguments, hands off to the run command, and maps errors to exit codes:
//! 0 for success, 1 for a builder that reported failure, 2 for resolution
//! and execution errors, 3 for workspace configuration problems.

mod cli;
mod commands;
pub mod builders;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod options;
pub mod progress;
pub mod scheduler;
pub mod target;
pub mod workspace;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::run(&cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
