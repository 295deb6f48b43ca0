//! Shared helpers for tests.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Change the process working directory for the duration of a test.
pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not
        // thread-safe. Lock it so tests don't race even if a #[serial]
        // annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Write a workspace configuration document into `dir` as `workspace.json`.
pub(crate) fn write_workspace(dir: &Path, doc: &Value) {
    let content = serde_json::to_string_pretty(doc).unwrap();
    std::fs::write(dir.join("workspace.json"), content).unwrap();
}

/// A small two-project workspace exercising both built-in builders.
pub(crate) fn sample_workspace() -> Value {
    json!({
        "version": 1,
        "defaultProject": "app",
        "projects": {
            "app": {
                "root": "app",
                "targets": {
                    "build": {
                        "builder": "echo",
                        "options": {"message": "building", "count": 3},
                        "configurations": {
                            "production": {"message": "building for production"}
                        }
                    },
                    "fail": {
                        "builder": "echo",
                        "options": {"message": "about to fail", "fail": true}
                    },
                    "slow": {
                        "builder": "shell",
                        "options": {"command": "sleep 10", "timeout": 1}
                    }
                }
            },
            "lib": {
                "root": "lib",
                "targets": {
                    "build": {
                        "builder": "echo",
                        "options": {"message": "building lib"}
                    }
                }
            }
        }
    })
}
