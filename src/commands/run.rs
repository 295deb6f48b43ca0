//! The run command.
//!
//! Discovers the workspace, schedules the selected target, renders live
//! progress while the builder works, and replays the buffered log after the
//! run completes. The returned exit code is 0 for a successful run and 1
//! for a builder that completed with a failure result; errors propagate to
//! `main`, which maps them to codes 2 and 3.

use crate::builders::BuilderRegistry;
use crate::cli::Cli;
use crate::error::Result;
use crate::events::{LogEntry, LogLevel, RunEvent};
use crate::exit_codes;
use crate::options;
use crate::progress::MultiProgressBar;
use crate::scheduler::Architect;
use crate::target::TargetSelector;
use crate::workspace::Workspace;
use colored::Colorize;

/// Entry point for the run command.
///
/// Invoked without a target, prints the long help and exits successfully,
/// so `architect` on its own is a cheap way to see usage.
pub fn run(cli: &Cli) -> Result<i32> {
    let Some(selector) = cli.target.as_deref() else {
        print_help();
        return Ok(exit_codes::SUCCESS);
    };

    let workspace = Workspace::discover()?;
    run_target(cli, selector, workspace)
}

fn print_help() {
    use clap::CommandFactory;
    let _ = Cli::command().print_long_help();
    println!();
}

fn run_target(cli: &Cli, selector: &str, workspace: Workspace) -> Result<i32> {
    if cli.verbose {
        eprintln!(
            "Using workspace configuration '{}'",
            workspace.config_path.display()
        );
    }

    let selector = TargetSelector::parse(selector)?;
    let overrides = options::parse_overrides(&cli.options);

    let architect = Architect::new(workspace, BuilderRegistry::with_defaults());
    let run = architect.schedule_target(&selector, &overrides)?;

    // Render progress live; hold log entries back until the bars are gone
    // so the two never interleave on the terminal.
    let mut bars = MultiProgressBar::new();
    let mut logs: Vec<LogEntry> = Vec::new();
    for event in run.events.iter() {
        match event {
            RunEvent::Progress(update) => bars.update(&update),
            RunEvent::Log(entry) => logs.push(entry),
        }
    }
    bars.clear();

    let result = run.wait();

    match &result {
        Ok(output) if output.success => println!("{}", "SUCCESS".green()),
        Ok(output) => {
            println!("{}", "FAILURE".yellow());
            if let Some(error) = &output.error {
                eprintln!("{}", error);
            }
        }
        Err(_) => println!("{}", "ERROR".red()),
    }

    replay_logs(&logs, cli.verbose);

    match result {
        Ok(output) if output.success => Ok(exit_codes::SUCCESS),
        Ok(_) => Ok(exit_codes::BUILDER_FAILURE),
        Err(err) => Err(err),
    }
}

/// Print the buffered run log. Debug entries are held back unless the user
/// asked for verbose output.
fn replay_logs(logs: &[LogEntry], verbose: bool) {
    let visible: Vec<_> = logs
        .iter()
        .filter(|entry| verbose || entry.level > LogLevel::Debug)
        .collect();
    if visible.is_empty() {
        return;
    }

    println!("\nLogs:");
    for entry in visible {
        let line = if verbose {
            format!("[{} {}] {}", entry.ts.format("%H:%M:%S"), entry.level, entry)
        } else {
            entry.to_string()
        };
        match entry.level {
            LogLevel::Warn => println!("{}", line.yellow()),
            LogLevel::Error => println!("{}", line.red()),
            _ => println!("{}", line),
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchitectError;
    use crate::test_support::{sample_workspace, write_workspace, DirGuard};
    use serial_test::serial;
    use tempfile::TempDir;

    fn cli(target: Option<&str>, options: &[&str]) -> Cli {
        Cli {
            target: target.map(|s| s.to_string()),
            verbose: false,
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn run_in_sample_workspace(cli: &Cli, selector: &str) -> Result<i32> {
        let temp_dir = TempDir::new().unwrap();
        write_workspace(temp_dir.path(), &sample_workspace());
        let workspace = Workspace::discover_from(temp_dir.path()).unwrap();
        run_target(cli, selector, workspace)
    }

    #[test]
    fn successful_run_exits_zero() {
        let cli = cli(Some("app:build"), &[]);
        let code = run_in_sample_workspace(&cli, "app:build").unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    fn failing_builder_exits_one() {
        let cli = cli(Some("app:fail"), &[]);
        let code = run_in_sample_workspace(&cli, "app:fail").unwrap();
        assert_eq!(code, exit_codes::BUILDER_FAILURE);
    }

    #[test]
    fn timed_out_command_is_a_failure_not_an_error() {
        let cli = cli(Some("app:slow"), &[]);
        let code = run_in_sample_workspace(&cli, "app:slow").unwrap();
        assert_eq!(code, exit_codes::BUILDER_FAILURE);
    }

    #[test]
    fn unknown_project_is_an_execution_error() {
        let cli = cli(Some("web:build"), &[]);
        let err = run_in_sample_workspace(&cli, "web:build").unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::EXECUTION_ERROR);
    }

    #[test]
    fn malformed_selector_is_an_execution_error() {
        let cli = cli(Some("a:b:c:d"), &[]);
        let err = run_in_sample_workspace(&cli, "a:b:c:d").unwrap_err();
        assert!(matches!(err, ArchitectError::TargetResolution(_)));
    }

    #[test]
    fn overrides_are_forwarded_to_the_builder() {
        // Overriding `fail` to false turns the failing target into a success.
        let cli = cli(Some("app:fail"), &["--no-fail"]);
        let code = run_in_sample_workspace(&cli, "app:fail").unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    #[serial]
    fn run_discovers_workspace_from_cwd() {
        let temp_dir = TempDir::new().unwrap();
        write_workspace(temp_dir.path(), &sample_workspace());

        let _guard = DirGuard::new(temp_dir.path());
        let code = run(&cli(Some(":build"), &[])).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    #[serial]
    fn run_without_config_exits_three() {
        let temp_dir = TempDir::new().unwrap();
        if crate::workspace::find_up(&crate::workspace::CONFIG_FILE_NAMES, temp_dir.path())
            .is_some()
        {
            return;
        }

        let _guard = DirGuard::new(temp_dir.path());
        let err = run(&cli(Some("app:build"), &[])).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn run_without_target_prints_help_and_succeeds() {
        let code = run(&cli(None, &[])).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }
}
