//! Workspace configuration discovery and target resolution.
//!
//! A workspace is described by a JSON configuration file that maps project
//! names to projects, and project names to the targets they expose. The file
//! is located by walking up from the invocation directory and trying a fixed
//! list of recognized filenames in each directory; the directory containing
//! the file becomes the workspace root.
//!
//! Parsing is forward compatible: unknown fields in the configuration are
//! ignored so that newer tools can extend the format without breaking older
//! readers.
//!
//! # Configuration Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "defaultProject": "app",
//!   "projects": {
//!     "app": {
//!       "root": "app",
//!       "targets": {
//!         "build": {
//!           "builder": "shell",
//!           "options": { "command": "make build" },
//!           "configurations": {
//!             "production": { "command": "make release" }
//!           },
//!           "defaultConfiguration": "production"
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! The legacy `architect` key is accepted as an alias for `targets`.

use crate::error::{ArchitectError, Result};
use crate::options;
use crate::target::{Target, TargetSelector};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Recognized workspace configuration filenames, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "architect.json",
    ".architect.json",
    "workspace.json",
    ".workspace.json",
];

/// Search upward from `from` for the first existing file with one of `names`.
///
/// Each directory is checked for every name (in order) before moving to its
/// parent, so a lower-priority name close to `from` wins over a
/// higher-priority name further up the tree.
pub fn find_up(names: &[&str], from: &Path) -> Option<PathBuf> {
    let mut current = Some(from);
    while let Some(dir) = current {
        for name in names {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        current = dir.parent();
    }
    None
}

/// The parsed workspace configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceDoc {
    /// Format version. Read but not enforced.
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<u32>,

    /// Project to use when the selector omits one.
    #[serde(default)]
    default_project: Option<String>,

    /// All projects in the workspace, by name.
    #[serde(default)]
    projects: BTreeMap<String, ProjectDef>,
}

/// A single project entry in the workspace configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDef {
    /// Project source root, relative to the workspace root.
    #[serde(default)]
    pub root: Option<String>,

    /// Targets exposed by this project, by name.
    #[serde(default, alias = "architect")]
    pub targets: BTreeMap<String, TargetDef>,
}

/// A single target entry in a project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDef {
    /// Name of the builder that runs this target.
    pub builder: String,

    /// Default options passed to the builder.
    #[serde(default)]
    pub options: Map<String, Value>,

    /// Named option overlays selectable via the configuration segment.
    #[serde(default)]
    pub configurations: BTreeMap<String, Map<String, Value>>,

    /// Configuration to apply when the selector omits one.
    #[serde(default)]
    pub default_configuration: Option<String>,
}

/// A target selector resolved against the workspace.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// The fully qualified target address.
    pub target: Target,

    /// Name of the builder to run.
    pub builder: String,

    /// Target options with the configuration overlay already applied.
    pub options: Map<String, Value>,
}

/// A loaded workspace: configuration document plus its on-disk location.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing the configuration file.
    pub root: PathBuf,

    /// Absolute path of the configuration file.
    pub config_path: PathBuf,

    doc: WorkspaceDoc,
}

impl Workspace {
    /// Discover and load the workspace from the current working directory.
    pub fn discover() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| ArchitectError::Execution(format!(
            "failed to get current working directory: {}",
            e
        )))?;
        Self::discover_from(&cwd)
    }

    /// Discover and load the workspace starting from a specific directory.
    ///
    /// This is useful for testing or when the start directory is known.
    pub fn discover_from<P: AsRef<Path>>(from: P) -> Result<Self> {
        let from = from.as_ref();
        let config_path = find_up(&CONFIG_FILE_NAMES, from).ok_or_else(|| {
            ArchitectError::ConfigNotFound {
                names: CONFIG_FILE_NAMES.join(", "),
                start: from.to_path_buf(),
            }
        })?;
        Self::load(&config_path)
    }

    /// Load a workspace from a known configuration file path.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let content = fs::read_to_string(config_path).map_err(|e| ArchitectError::Config {
            path: config_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let doc: WorkspaceDoc =
            serde_json::from_str(&content).map_err(|e| ArchitectError::Config {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let root = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Ok(Self {
            root,
            config_path: config_path.to_path_buf(),
            doc,
        })
    }

    /// The workspace's default project, if one is declared.
    pub fn default_project(&self) -> Option<&str> {
        self.doc.default_project.as_deref()
    }

    /// Names of all projects in the workspace.
    pub fn project_names(&self) -> Vec<&str> {
        self.doc.projects.keys().map(|s| s.as_str()).collect()
    }

    /// Look up a project by name.
    pub fn project(&self, name: &str) -> Result<&ProjectDef> {
        self.doc.projects.get(name).ok_or_else(|| {
            ArchitectError::TargetResolution(format!(
                "project '{}' not found in workspace (available: {})",
                name,
                join_or_none(self.project_names())
            ))
        })
    }

    /// Resolve a selector into a concrete target, builder, and option set.
    ///
    /// Missing selector segments fall back to workspace defaults: the
    /// project to `defaultProject`, the configuration to the target's
    /// `defaultConfiguration`. The target name has no default and must be
    /// present.
    pub fn resolve(&self, selector: &TargetSelector) -> Result<ResolvedTarget> {
        let project_name = selector
            .project
            .as_deref()
            .or(self.default_project())
            .ok_or_else(|| {
                ArchitectError::TargetResolution(
                    "no project specified and the workspace declares no defaultProject"
                        .to_string(),
                )
            })?;

        let project = self.project(project_name)?;

        let target_name = selector.target.as_deref().ok_or_else(|| {
            ArchitectError::TargetResolution(format!(
                "no target specified for project '{}' (available: {})",
                project_name,
                join_or_none(project.targets.keys().map(|s| s.as_str()).collect())
            ))
        })?;

        let target_def = project.targets.get(target_name).ok_or_else(|| {
            ArchitectError::TargetResolution(format!(
                "target '{}' not found in project '{}' (available: {})",
                target_name,
                project_name,
                join_or_none(project.targets.keys().map(|s| s.as_str()).collect())
            ))
        })?;

        let configuration = selector
            .configuration
            .clone()
            .or_else(|| target_def.default_configuration.clone());

        let options = match &configuration {
            Some(name) => {
                let overlay = target_def.configurations.get(name).ok_or_else(|| {
                    ArchitectError::TargetResolution(format!(
                        "configuration '{}' not found for target '{}:{}' (available: {})",
                        name,
                        project_name,
                        target_name,
                        join_or_none(
                            target_def
                                .configurations
                                .keys()
                                .map(|s| s.as_str())
                                .collect()
                        )
                    ))
                })?;
                options::merge(&target_def.options, overlay)
            }
            None => target_def.options.clone(),
        };

        Ok(ResolvedTarget {
            target: Target {
                project: project_name.to_string(),
                target: target_name.to_string(),
                configuration,
            },
            builder: target_def.builder.clone(),
            options,
        })
    }
}

fn join_or_none(names: Vec<&str>) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
