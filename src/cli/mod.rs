//! CLI argument parsing for architect.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command surface; the implementation lives in
//! the `commands` module.

use clap::Parser;

/// Architect: run a project target from the workspace configuration.
///
/// The target is selected with `project:target[:configuration]`. Omitted
/// segments fall back to the workspace defaults, so `:build` runs the
/// `build` target of the default project. Everything after the selector is
/// passed to the builder as option overrides.
#[derive(Parser, Debug)]
#[command(name = "architect")]
#[command(author, version, about)]
#[command(
    long_about = "Run a target in the workspace.\n\n\
        The target is selected with 'project:target:configuration'. If the \
        project or configuration segment is empty or missing, the workspace \
        defaults will be used.\n\n\
        Any additional '--key value' arguments override the target's \
        configured options for this run."
)]
pub struct Cli {
    /// Target to run, as `project:target[:configuration]`.
    pub target: Option<String>,

    /// Replay debug log entries after the run, not just info and above.
    #[arg(long, short)]
    pub verbose: bool,

    /// Option overrides passed to the builder, e.g. `--watch --port 8080`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub options: Vec<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
