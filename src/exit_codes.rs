//! Exit code constants for the architect CLI.
//!
//! These codes follow the runner contract:
//! - 0: Builder reported success
//! - 1: Builder ran and reported failure
//! - 2: Execution error (resolution failure or builder exception)
//! - 3: Workspace configuration file could not be found or loaded

/// Builder completed and reported success.
pub const SUCCESS: i32 = 0;

/// Builder completed and reported failure.
pub const BUILDER_FAILURE: i32 = 1;

/// Execution error: target resolution failed or the builder raised an error.
pub const EXECUTION_ERROR: i32 = 2;

/// Workspace configuration file not found or invalid.
pub const CONFIG_ERROR: i32 = 3;
