//! Error types for the architect CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for architect operations.
///
/// Each variant maps to a specific exit code: workspace configuration
/// problems exit with 3, everything that goes wrong during resolution or
/// execution exits with 2. A builder that runs to completion but reports
/// failure is not an error; it is surfaced as exit code 1 by the run command.
#[derive(Error, Debug)]
pub enum ArchitectError {
    /// No recognized workspace configuration file in the start directory or
    /// any of its ancestors.
    #[error(
        "workspace configuration file ({names}) cannot be found in '{}' or in parent directories",
        start.display()
    )]
    ConfigNotFound { names: String, start: PathBuf },

    /// The workspace configuration file exists but could not be read or parsed.
    #[error("failed to load workspace configuration '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The target selector could not be resolved against the workspace.
    #[error("{0}")]
    TargetResolution(String),

    /// The builder raised an error while running (as opposed to completing
    /// with a failure result).
    #[error("{0}")]
    Execution(String),
}

impl ArchitectError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ArchitectError::ConfigNotFound { .. } => exit_codes::CONFIG_ERROR,
            ArchitectError::Config { .. } => exit_codes::CONFIG_ERROR,
            ArchitectError::TargetResolution(_) => exit_codes::EXECUTION_ERROR,
            ArchitectError::Execution(_) => exit_codes::EXECUTION_ERROR,
        }
    }
}

/// Result type alias for architect operations.
pub type Result<T> = std::result::Result<T, ArchitectError>;
