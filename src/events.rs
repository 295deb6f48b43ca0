//! Run event stream for architect.
//!
//! A scheduled run produces a single ordered stream of [`RunEvent`]s on an
//! mpsc channel: log entries emitted by the builder and progress updates
//! describing where the builder is in its work. The run command consumes the
//! stream on the main thread, rendering progress live and buffering logs for
//! replay after the run completes.
//!
//! Builders never touch the channel directly; they are handed a [`Logger`]
//! and a [`ProgressReporter`] through their context. Both handles ignore
//! send failures so a builder keeps working even if the consumer went away.

use crate::target::Target;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// A single log entry produced during a run.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// When the entry was emitted.
    pub ts: DateTime<Utc>,

    /// Severity of the entry.
    pub level: LogLevel,

    /// Name of the logger that produced the entry (usually the target string).
    pub name: String,

    /// The message itself.
    pub message: String,
}

impl LogEntry {
    /// Create a new entry timestamped now.
    pub fn new(level: LogLevel, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            level,
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Lifecycle states a builder run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderProgressState {
    /// Scheduled but not yet doing work.
    Waiting,
    /// Actively working; `current`/`total` describe how far along.
    Running,
    /// Finished, successfully or not.
    Stopped,
    /// The builder raised an error.
    Error,
}

/// A progress update for one run.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Identifier of the run this update belongs to.
    pub id: usize,

    /// Name of the builder doing the work.
    pub builder: String,

    /// The target being run.
    pub target: Target,

    /// Lifecycle state.
    pub state: BuilderProgressState,

    /// Work completed so far.
    pub current: u64,

    /// Total work units, when the builder knows them.
    pub total: Option<u64>,

    /// Free-form status line shown next to the progress bar.
    pub status: Option<String>,

    /// Error message, only meaningful in the `Error` state.
    pub error: Option<String>,
}

/// Events emitted by a scheduled run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Log(LogEntry),
    Progress(ProgressUpdate),
}

/// Logging handle handed to builders.
///
/// Entries are forwarded into the run's event stream; nothing is printed
/// until the run command replays the buffered log after completion.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    sender: Sender<RunEvent>,
}

impl Logger {
    pub fn new(name: impl Into<String>, sender: Sender<RunEvent>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, self.name.clone(), message);
        // The receiver dropping is not the builder's problem.
        let _ = self.sender.send(RunEvent::Log(entry));
    }
}

/// Progress handle handed to builders.
///
/// Tracks the last reported `current`/`total` so the scheduler can emit a
/// final `Stopped` update that completes the progress bar.
#[derive(Debug)]
pub struct ProgressReporter {
    id: usize,
    builder: String,
    target: Target,
    sender: Sender<RunEvent>,
    state: Mutex<(u64, Option<u64>)>,
}

impl ProgressReporter {
    pub fn new(
        id: usize,
        builder: impl Into<String>,
        target: Target,
        sender: Sender<RunEvent>,
    ) -> Self {
        Self {
            id,
            builder: builder.into(),
            target,
            sender,
            state: Mutex::new((0, None)),
        }
    }

    /// Report that the run is waiting to start.
    pub fn waiting(&self, status: Option<&str>) {
        self.send(BuilderProgressState::Waiting, status, None);
    }

    /// Begin running with a known (or unknown) amount of total work.
    pub fn start(&self, total: Option<u64>, status: Option<&str>) {
        {
            let mut state = self.lock_state();
            *state = (0, total);
        }
        self.send(BuilderProgressState::Running, status, None);
    }

    /// Report progress within the current total.
    pub fn advance(&self, current: u64, status: Option<&str>) {
        {
            let mut state = self.lock_state();
            state.0 = current;
        }
        self.send(BuilderProgressState::Running, status, None);
    }

    /// Report completion. Emitted by the scheduler after the builder returns.
    pub(crate) fn stopped(&self) {
        {
            let mut state = self.lock_state();
            if let Some(total) = state.1 {
                state.0 = total;
            }
        }
        self.send(BuilderProgressState::Stopped, None, None);
    }

    /// Report a builder error. Emitted by the scheduler when the builder fails.
    pub(crate) fn errored(&self, message: &str) {
        self.send(BuilderProgressState::Error, None, Some(message));
    }

    fn send(&self, state: BuilderProgressState, status: Option<&str>, error: Option<&str>) {
        let (current, total) = *self.lock_state();
        let update = ProgressUpdate {
            id: self.id,
            builder: self.builder.clone(),
            target: self.target.clone(),
            state,
            current,
            total,
            status: status.map(|s| s.to_string()),
            error: error.map(|s| s.to_string()),
        };
        let _ = self.sender.send(RunEvent::Progress(update));
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, (u64, Option<u64>)> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
