//! Target addressing for architect.
//!
//! A target is the `(project, target name, configuration)` triple that
//! identifies one invokable unit of work in a workspace. On the command line
//! it is written as `project:target:configuration`, where any segment may be
//! left empty to request the workspace default.

use crate::error::{ArchitectError, Result};
use std::fmt;

/// A fully resolved target address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Name of the project that owns the target.
    pub project: String,

    /// Name of the target within the project.
    pub target: String,

    /// Named configuration overlay, if one applies.
    pub configuration: Option<String>,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.target)?;
        if let Some(configuration) = &self.configuration {
            write!(f, ":{}", configuration)?;
        }
        Ok(())
    }
}

/// A partially specified target address as typed by the user.
///
/// Omitted or empty segments are `None` and resolve to workspace defaults
/// during [`crate::workspace::Workspace::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelector {
    pub project: Option<String>,
    pub target: Option<String>,
    pub configuration: Option<String>,
}

impl TargetSelector {
    /// Parse a selector string of the form `[project][:target][:configuration]`.
    ///
    /// Empty segments are allowed and mean "use the workspace default", so
    /// `:build` selects the `build` target of the default project.
    ///
    /// # Examples
    ///
    /// ```text
    /// let selector = TargetSelector::parse("app:build:production").unwrap();
    /// assert_eq!(selector.project.as_deref(), Some("app"));
    /// assert_eq!(selector.target.as_deref(), Some("build"));
    /// assert_eq!(selector.configuration.as_deref(), Some("production"));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let mut segments = s.split(':');

        let project = segments.next().and_then(non_empty);
        let target = segments.next().and_then(non_empty);
        let configuration = segments.next().and_then(non_empty);

        if segments.next().is_some() {
            return Err(ArchitectError::TargetResolution(format!(
                "invalid target '{}': expected at most three ':'-separated segments \
                 (project:target:configuration)",
                s
            )));
        }

        Ok(Self {
            project,
            target,
            configuration,
        })
    }
}

fn non_empty(segment: &str) -> Option<String> {
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}
