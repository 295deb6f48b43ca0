//! Builder trait, context, and registry.
//!
//! A builder is a named unit of executable work. Targets in the workspace
//! configuration name the builder that runs them; the registry maps those
//! names to implementations. The built-in set covers running a shell command
//! (`shell`) and emitting messages with step-wise progress (`echo`).
//!
//! Builders distinguish two failure shapes:
//! - `Ok(BuilderOutput { success: false, .. })`: the work ran and failed
//!   (a failing test suite, a non-zero exit). The CLI reports FAILURE and
//!   exits 1.
//! - `Err(_)`: the builder itself could not do its job (bad options, spawn
//!   failure). The CLI reports ERROR and exits 2.

mod echo;
mod shell;

pub use echo::EchoBuilder;
pub use shell::ShellBuilder;

use crate::error::{ArchitectError, Result};
use crate::events::{Logger, ProgressReporter};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a builder needs besides its options.
#[derive(Debug)]
pub struct BuilderContext {
    /// Directory containing the workspace configuration file.
    pub workspace_root: PathBuf,

    /// Log entries flow into the run's event stream and are replayed after
    /// the run completes.
    pub logger: Logger,

    /// Progress updates flow into the run's event stream and drive the
    /// terminal progress bars.
    pub progress: ProgressReporter,
}

/// Result of a builder run that completed without raising an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOutput {
    /// Whether the work succeeded.
    pub success: bool,

    /// Failure description when `success` is false.
    pub error: Option<String>,
}

impl BuilderOutput {
    /// A successful output.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed output with a description of what went wrong.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// A named unit of executable work.
pub trait Builder: Send + Sync {
    /// Execute the builder with the merged option object for this run.
    fn run(&self, ctx: &BuilderContext, options: &Map<String, Value>) -> Result<BuilderOutput>;
}

/// Maps builder names to implementations.
///
/// `register` is the seam where dynamically loaded builders would attach;
/// the CLI itself only registers the built-in set.
#[derive(Clone)]
pub struct BuilderRegistry {
    builders: BTreeMap<String, Arc<dyn Builder>>,
}

impl BuilderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            builders: BTreeMap::new(),
        }
    }

    /// A registry with the built-in builders registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("echo", Arc::new(EchoBuilder));
        registry.register("shell", Arc::new(ShellBuilder));
        registry
    }

    /// Register a builder under a name, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, builder: Arc<dyn Builder>) {
        self.builders.insert(name.into(), builder);
    }

    /// Look up a builder by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Builder>> {
        self.builders.get(name).cloned()
    }

    /// Names of all registered builders.
    pub fn names(&self) -> Vec<&str> {
        self.builders.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Typed option accessors
// ============================================================================
// Builders read their options from the merged JSON object. These helpers
// produce user-actionable errors naming the option and the expected type.

pub(crate) fn required_str<'a>(
    builder: &str,
    options: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str> {
    match options.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(type_error(builder, key, "a string", other)),
        None => Err(ArchitectError::Execution(format!(
            "builder '{}' requires the '{}' option",
            builder, key
        ))),
    }
}

pub(crate) fn optional_str<'a>(
    builder: &str,
    options: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>> {
    match options.get(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(type_error(builder, key, "a string", other)),
        None => Ok(None),
    }
}

pub(crate) fn optional_bool(
    builder: &str,
    options: &Map<String, Value>,
    key: &str,
) -> Result<Option<bool>> {
    match options.get(key) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(builder, key, "a boolean", other)),
        None => Ok(None),
    }
}

pub(crate) fn optional_u64(
    builder: &str,
    options: &Map<String, Value>,
    key: &str,
) -> Result<Option<u64>> {
    match options.get(key) {
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            ArchitectError::Execution(format!(
                "builder '{}' option '{}' must be a non-negative integer, got {}",
                builder, key, n
            ))
        }),
        Some(other) => Err(type_error(builder, key, "a non-negative integer", other)),
        None => Ok(None),
    }
}

fn type_error(builder: &str, key: &str, expected: &str, got: &Value) -> ArchitectError {
    ArchitectError::Execution(format!(
        "builder '{}' option '{}' must be {}, got {}",
        builder, key, expected, got
    ))
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::events::RunEvent;
    use crate::target::Target;
    use std::sync::mpsc::{self, Receiver};

    /// Build a context wired to a fresh channel, for exercising builders
    /// directly in tests.
    pub(crate) fn test_context(workspace_root: PathBuf) -> (BuilderContext, Receiver<RunEvent>) {
        let (tx, rx) = mpsc::channel();
        let target = Target {
            project: "app".to_string(),
            target: "build".to_string(),
            configuration: None,
        };
        let ctx = BuilderContext {
            workspace_root,
            logger: Logger::new(target.to_string(), tx.clone()),
            progress: ProgressReporter::new(0, "test", target, tx),
        };
        (ctx, rx)
    }
}
