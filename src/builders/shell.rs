//! Shell command builder.
//!
//! Runs a single command line in the workspace (or a subdirectory of it),
//! captures its output into the run log, and reports the exit status as the
//! builder result. A timeout kills the child and reports failure.
//!
//! # Options
//!
//! - `command` (string, required): the command line, split shell-style.
//! - `cwd` (string): working directory relative to the workspace root.
//! - `env` (object of strings): extra environment variables for the child.
//! - `timeout` (integer): maximum runtime in seconds before the child is
//!   killed.

use super::{optional_str, optional_u64, required_str, Builder, BuilderContext, BuilderOutput};
use crate::error::{ArchitectError, Result};
use crate::events::Logger;
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often to poll a running child while waiting for it to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ShellBuilder;

impl Builder for ShellBuilder {
    fn run(&self, ctx: &BuilderContext, options: &Map<String, Value>) -> Result<BuilderOutput> {
        let command_line = required_str("shell", options, "command")?;
        let cwd = optional_str("shell", options, "cwd")?;
        let timeout = optional_u64("shell", options, "timeout")?;

        let args = shell_words::split(command_line).map_err(|e| {
            ArchitectError::Execution(format!(
                "failed to parse command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                command_line, e
            ))
        })?;

        let Some((program, program_args)) = args.split_first() else {
            return Err(ArchitectError::Execution(format!(
                "command is empty after parsing: '{}'",
                command_line
            )));
        };

        let working_dir = match cwd {
            Some(rel) => ctx.workspace_root.join(rel),
            None => ctx.workspace_root.clone(),
        };

        let mut command = Command::new(program);
        command
            .args(program_args)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        apply_env(&mut command, options)?;

        ctx.logger.debug(format!(
            "running '{}' in '{}'",
            command_line,
            working_dir.display()
        ));
        ctx.progress.start(None, Some(command_line));

        let mut child = command.spawn().map_err(|e| {
            ArchitectError::Execution(format!(
                "failed to execute command '{}' in '{}': {}\n\
                 Fix: ensure the command is installed and in PATH.",
                program,
                working_dir.display(),
                e
            ))
        })?;

        // Drain the pipes on their own threads so the child can never block
        // on a full pipe buffer while we poll for exit.
        let stdout_lines = drain_stdout(child.stdout.take(), &ctx.logger);
        let stderr_lines = drain_stderr(child.stderr.take(), &ctx.logger);

        let (exit_code, timed_out) = wait_with_timeout(&mut child, timeout)?;

        if let Some(handle) = stdout_lines {
            let _ = handle.join();
        }
        if let Some(handle) = stderr_lines {
            let _ = handle.join();
        }

        if timed_out {
            let message = format!(
                "command '{}' timed out after {}s",
                command_line,
                timeout.unwrap_or(0)
            );
            ctx.logger.error(message.clone());
            return Ok(BuilderOutput::failure(message));
        }

        match exit_code {
            Some(0) => Ok(BuilderOutput::ok()),
            Some(code) => Ok(BuilderOutput::failure(format!(
                "command '{}' exited with code {}",
                command_line, code
            ))),
            None => Ok(BuilderOutput::failure(format!(
                "command '{}' was terminated by a signal",
                command_line
            ))),
        }
    }
}

fn apply_env(command: &mut Command, options: &Map<String, Value>) -> Result<()> {
    let Some(env) = options.get("env") else {
        return Ok(());
    };
    let Value::Object(env) = env else {
        return Err(ArchitectError::Execution(format!(
            "builder 'shell' option 'env' must be an object of strings, got {}",
            env
        )));
    };
    for (key, value) in env {
        let Value::String(value) = value else {
            return Err(ArchitectError::Execution(format!(
                "builder 'shell' option 'env.{}' must be a string, got {}",
                key, value
            )));
        };
        command.env(key, value);
    }
    Ok(())
}

fn drain_stdout(stdout: Option<ChildStdout>, logger: &Logger) -> Option<JoinHandle<()>> {
    let stdout = stdout?;
    let logger = logger.clone();
    Some(thread::spawn(move || {
        for line in BufReader::new(stdout).lines() {
            match line {
                Ok(line) => logger.info(line),
                Err(_) => break,
            }
        }
    }))
}

fn drain_stderr(stderr: Option<ChildStderr>, logger: &Logger) -> Option<JoinHandle<()>> {
    let stderr = stderr?;
    let logger = logger.clone();
    Some(thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            match line {
                Ok(line) => logger.warn(line),
                Err(_) => break,
            }
        }
    }))
}

/// Wait for a child process, killing it if the timeout expires.
///
/// Returns (exit_code, timed_out). A `timeout` of `None` waits forever.
fn wait_with_timeout(child: &mut Child, timeout: Option<u64>) -> Result<(Option<i32>, bool)> {
    let Some(timeout) = timeout else {
        let status = child.wait().map_err(|e| {
            ArchitectError::Execution(format!("failed to wait for command: {}", e))
        })?;
        return Ok((status.code(), false));
    };

    let start = Instant::now();
    let timeout = Duration::from_secs(timeout);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok((None, true));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(ArchitectError::Execution(format!(
                    "failed to check command status: {}",
                    e
                )));
            }
        }
    }
}

/// Kill a process and wait for it to terminate.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}
