//! Command implementations for architect.
//!
//! The CLI has a single command: run a target. The argument surface is
//! defined in the `cli` module; this module owns the behavior.

mod run;

pub use run::run;
