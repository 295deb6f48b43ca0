//! Target scheduling and execution.
//!
//! [`Architect`] is the entry point into the runtime: it resolves a target
//! selector against the workspace, looks up the named builder, merges the
//! option layers, and runs the builder on a worker thread. The caller gets a
//! [`Run`]: an event stream to consume while the builder works, and a
//! `wait` to collect the final output.
//!
//! The event channel closes when the builder finishes, so consuming the
//! stream to exhaustion and then calling [`Run::wait`] never blocks on a
//! live builder.

use crate::builders::{Builder, BuilderContext, BuilderOutput, BuilderRegistry};
use crate::error::{ArchitectError, Result};
use crate::events::{Logger, ProgressReporter, RunEvent};
use crate::options;
use crate::target::TargetSelector;
use crate::workspace::Workspace;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Run ids are unique per process so concurrent runs can share a renderer.
static NEXT_RUN_ID: AtomicUsize = AtomicUsize::new(1);

/// Schedules targets of one workspace against a builder registry.
pub struct Architect {
    workspace: Workspace,
    registry: BuilderRegistry,
}

impl Architect {
    pub fn new(workspace: Workspace, registry: BuilderRegistry) -> Self {
        Self {
            workspace,
            registry,
        }
    }

    /// Schedule one target for execution.
    ///
    /// Resolution problems (unknown project, target, configuration, or
    /// builder name) fail here, before any thread is spawned. The returned
    /// [`Run`] is already executing.
    pub fn schedule_target(
        &self,
        selector: &TargetSelector,
        overrides: &Map<String, Value>,
    ) -> Result<Run> {
        let resolved = self.workspace.resolve(selector)?;

        let builder: Arc<dyn Builder> = self.registry.get(&resolved.builder).ok_or_else(|| {
            ArchitectError::TargetResolution(format!(
                "no builder named '{}' is registered for target '{}' (available: {})",
                resolved.builder,
                resolved.target,
                self.registry.names().join(", ")
            ))
        })?;

        let merged_options = options::merge(&resolved.options, overrides);

        let (tx, rx) = mpsc::channel();
        let id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);

        let ctx = BuilderContext {
            workspace_root: self.workspace.root.clone(),
            logger: Logger::new(resolved.target.to_string(), tx.clone()),
            progress: ProgressReporter::new(id, resolved.builder.clone(), resolved.target, tx),
        };

        // Let consumers see the run before the builder gets going.
        ctx.progress.waiting(None);

        let handle = std::thread::Builder::new()
            .name(format!("run-{}", id))
            .spawn(move || {
                // Catch panics so the run's bar still gets a terminal update
                // before the panic propagates to `Run::wait`.
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    builder.run(&ctx, &merged_options)
                }));
                match result {
                    Ok(result) => {
                        match &result {
                            Ok(_) => ctx.progress.stopped(),
                            Err(e) => ctx.progress.errored(&e.to_string()),
                        }
                        result
                    }
                    Err(payload) => {
                        ctx.progress.errored("builder panicked while running");
                        std::panic::resume_unwind(payload)
                    }
                }
            })
            .map_err(|e| {
                ArchitectError::Execution(format!("failed to spawn builder thread: {}", e))
            })?;

        Ok(Run { events: rx, handle })
    }
}

/// A scheduled, executing builder run.
#[derive(Debug)]
pub struct Run {
    /// Log entries and progress updates, in emission order. The channel
    /// closes when the builder finishes.
    pub events: Receiver<RunEvent>,

    handle: JoinHandle<Result<BuilderOutput>>,
}

impl Run {
    /// Wait for the builder to finish and collect its output.
    pub fn wait(self) -> Result<BuilderOutput> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(ArchitectError::Execution(
                "builder panicked while running".to_string(),
            )),
        }
    }
}
