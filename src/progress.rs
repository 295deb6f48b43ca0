//! Terminal progress rendering.
//!
//! Renders [`ProgressUpdate`]s as a stack of progress bars, one per run.
//! Bars are created lazily the first time an update for a run id arrives,
//! so the renderer works for a single run or several concurrent ones
//! without being told up front.

use crate::events::{BuilderProgressState, ProgressUpdate};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;

/// Longest target string shown in a bar prefix.
const MAX_NAME_LEN: usize = 40;

/// A stack of per-run progress bars.
pub struct MultiProgressBar {
    multi: MultiProgress,
    bars: BTreeMap<usize, ProgressBar>,
}

impl MultiProgressBar {
    /// A renderer drawing to stderr.
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// A renderer drawing nowhere, for tests.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: BTreeMap::new(),
        }
    }

    /// Apply one update to the bar for its run, creating the bar if this is
    /// the first update seen for that run id.
    pub fn update(&mut self, update: &ProgressUpdate) {
        let bar = self.bars.entry(update.id).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::no_length());
            bar.set_prefix(truncate_name(&update.target.to_string()));
            bar
        });

        match update.state {
            BuilderProgressState::Waiting => {
                bar.set_style(spinner_style());
                bar.set_message(
                    update
                        .status
                        .clone()
                        .unwrap_or_else(|| format!("Waiting for builder '{}'...", update.builder)),
                );
            }
            BuilderProgressState::Running => {
                match update.total {
                    Some(total) => {
                        bar.set_style(bar_style());
                        bar.set_length(total);
                        bar.set_position(update.current);
                    }
                    None => bar.set_style(spinner_style()),
                }
                if let Some(status) = &update.status {
                    bar.set_message(status.clone());
                }
            }
            BuilderProgressState::Stopped => {
                if let Some(total) = update.total {
                    bar.set_style(bar_style());
                    bar.set_length(total);
                    bar.set_position(total);
                }
                bar.finish_with_message("Done.");
            }
            BuilderProgressState::Error => {
                let message = match &update.error {
                    Some(error) => format!("Error: {}", error),
                    None => "Error.".to_string(),
                };
                bar.abandon_with_message(message);
            }
        }
    }

    /// Remove all bars from the terminal.
    pub fn clear(&mut self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
        let _ = self.multi.clear();
        self.bars.clear();
    }
}

impl Default for MultiProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    // "{prefix} {bar} ({pos}/{len}) {msg}"; the template is static, so
    // expect here can only fire on a typo caught by every test run.
    ProgressStyle::with_template("{prefix} {bar:25} ({pos}/{len}) {msg}")
        .expect("static progress template")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} {spinner} {msg}").expect("static progress template")
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_LEN {
        name.to_string()
    } else {
        name.chars().take(MAX_NAME_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;

    fn update(id: usize, state: BuilderProgressState) -> ProgressUpdate {
        ProgressUpdate {
            id,
            builder: "echo".to_string(),
            target: Target {
                project: "app".to_string(),
                target: "build".to_string(),
                configuration: None,
            },
            state,
            current: 0,
            total: None,
            status: None,
            error: None,
        }
    }

    #[test]
    fn creates_one_bar_per_run_id() {
        let mut bars = MultiProgressBar::hidden();
        bars.update(&update(1, BuilderProgressState::Waiting));
        bars.update(&update(2, BuilderProgressState::Waiting));
        bars.update(&update(1, BuilderProgressState::Running));
        assert_eq!(bars.bars.len(), 2);
    }

    #[test]
    fn running_update_sets_length_and_position() {
        let mut bars = MultiProgressBar::hidden();
        let mut u = update(1, BuilderProgressState::Running);
        u.current = 2;
        u.total = Some(5);
        bars.update(&u);

        let bar = &bars.bars[&1];
        assert_eq!(bar.length(), Some(5));
        assert_eq!(bar.position(), 2);
    }

    #[test]
    fn stopped_update_finishes_the_bar_at_total() {
        let mut bars = MultiProgressBar::hidden();
        let mut u = update(1, BuilderProgressState::Running);
        u.total = Some(4);
        bars.update(&u);

        let mut done = update(1, BuilderProgressState::Stopped);
        done.current = 4;
        done.total = Some(4);
        bars.update(&done);

        let bar = &bars.bars[&1];
        assert!(bar.is_finished());
        assert_eq!(bar.position(), 4);
    }

    #[test]
    fn error_update_abandons_with_message() {
        let mut bars = MultiProgressBar::hidden();
        let mut u = update(1, BuilderProgressState::Error);
        u.error = Some("spawn failed".to_string());
        bars.update(&u);

        let bar = &bars.bars[&1];
        assert!(bar.is_finished());
        assert_eq!(bar.message(), "Error: spawn failed");
    }

    #[test]
    fn clear_removes_all_bars() {
        let mut bars = MultiProgressBar::hidden();
        bars.update(&update(1, BuilderProgressState::Waiting));
        bars.update(&update(2, BuilderProgressState::Waiting));
        bars.clear();
        assert!(bars.bars.is_empty());
    }

    #[test]
    fn long_target_names_are_truncated() {
        let long = "a".repeat(60);
        assert_eq!(truncate_name(&long).len(), MAX_NAME_LEN);
        assert_eq!(truncate_name("app:build"), "app:build");
    }
}
