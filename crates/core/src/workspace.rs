use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::configs::project::ProjectConfig;
use crate::configs::workspace::{
    parse_workspace_config, parse_workspace_config_toml, WorkspaceConfig,
};
use crate::types::{SweepError, SweepResult};

/// Config file names looked up at the workspace root, in order of preference
pub const CONFIG_FILE_NAMES: &[&str] = &["sweep.yml", "sweep.yaml", "sweep.toml"];

const DEFAULT_EXCLUDE_GLOBS: &[&str] = &[
    "**/.git",
    "**/.git/**",
    "**/target",
    "**/target/**",
    "**/node_modules",
    "**/node_modules/**",
];

/// A loaded workspace: its root, its configuration and the resolved project list
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    /// Configured projects followed by discovered ones, in dispatch order
    pub projects: Vec<ProjectConfig>,
}

impl Workspace {
    /// Load the workspace whose config file lives directly in `root`
    pub fn load(root: &Path) -> SweepResult<Self> {
        let config = load_workspace_config(root)?;
        Self::from_config(root.to_path_buf(), config)
    }

    pub fn from_config(root: PathBuf, config: WorkspaceConfig) -> SweepResult<Self> {
        config.validate()?;
        let mut projects = config.projects.clone();
        if !config.discover.is_empty() {
            let discovered = discover_projects(&root, &config.discover, &config.excludes, &projects)?;
            projects.extend(discovered);
        }

        Ok(Self {
            root,
            config,
            projects,
        })
    }

    pub fn find_project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Absolute directory of a project
    pub fn project_dir(&self, project: &ProjectConfig) -> PathBuf {
        self.root.join(&project.path)
    }
}

/// Path of the first config file present in `dir`
pub fn config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Walk up from `start` to the nearest directory holding a config file
pub fn find_workspace_root(start: &Path) -> SweepResult<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()?.join(start)
    };

    for dir in start.ancestors() {
        if config_file_in(dir).is_some() {
            return Ok(dir.to_path_buf());
        }
    }

    Err(SweepError::Workspace(format!(
        "No {} found in {} or any parent directory",
        CONFIG_FILE_NAMES.join(" / "),
        start.display()
    )))
}

pub fn load_workspace_config(root: &Path) -> SweepResult<WorkspaceConfig> {
    let config_path = config_file_in(root).ok_or_else(|| {
        SweepError::Workspace(format!(
            "No {} found in {}",
            CONFIG_FILE_NAMES.join(" / "),
            root.display()
        ))
    })?;

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        SweepError::Config(format!(
            "Failed to read workspace config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    let parsed = if config_path.extension().and_then(|s| s.to_str()) == Some("toml") {
        parse_workspace_config_toml(&content)
    } else {
        parse_workspace_config(&content)
    };

    parsed.map_err(|e| {
        SweepError::Config(format!(
            "Failed to parse workspace config {}: {}",
            config_path.display(),
            e
        ))
    })
}

fn build_glob_set(patterns: &[String]) -> SweepResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| SweepError::Config(format!("Invalid glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SweepError::Config(format!("Invalid glob set: {}", e)))
}

/// How many directory levels below the root a pattern can match, `None` if unbounded
fn pattern_depth(pattern: &str) -> Option<usize> {
    if pattern.contains("**") {
        return None;
    }
    Some(pattern.trim_matches('/').split('/').count())
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Find directories under `root` matching `patterns` that `known` does not already list.
///
/// Discovered projects are optional, named after their directory (or their
/// relative path when that name is taken) and returned sorted by path.
/// Matching directories are not searched for nested projects.
pub fn discover_projects(
    root: &Path,
    patterns: &[String],
    excludes: &[String],
    known: &[ProjectConfig],
) -> SweepResult<Vec<ProjectConfig>> {
    let include_set = build_glob_set(patterns)?;

    let mut exclude_patterns = DEFAULT_EXCLUDE_GLOBS
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    exclude_patterns.extend(excludes.iter().cloned());
    let exclude_set = build_glob_set(&exclude_patterns)?;

    let max_depth = patterns
        .iter()
        .map(|p| pattern_depth(p))
        .try_fold(0usize, |acc, depth| depth.map(|d| acc.max(d)));

    let known_paths: HashSet<String> = known
        .iter()
        .map(|p| p.path.trim_matches('/').trim_start_matches("./").to_string())
        .collect();
    let mut taken_names: HashSet<String> = known.iter().map(|p| p.name.clone()).collect();

    let mut matched = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((root.to_path_buf(), 0usize));

    while let Some((current_dir, depth)) = queue.pop_front() {
        let entries = match std::fs::read_dir(&current_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping unreadable directory {}: {}", current_dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let relative = relative_slash_path(root, &path);
            if exclude_set.is_match(&relative) {
                continue;
            }

            if include_set.is_match(&relative) {
                if !known_paths.contains(&relative) {
                    matched.push(relative);
                }
                continue;
            }

            if max_depth.map_or(true, |max| depth + 1 < max) {
                queue.push_back((path, depth + 1));
            }
        }
    }

    matched.sort();

    let projects = matched
        .into_iter()
        .map(|relative| {
            let dir_name = relative.rsplit('/').next().unwrap_or(&relative).to_string();
            let name = if taken_names.contains(&dir_name) {
                relative.clone()
            } else {
                dir_name
            };
            taken_names.insert(name.clone());
            tracing::debug!("Discovered project '{}' at {}", name, relative);
            ProjectConfig::new(name, relative, false)
        })
        .collect();

    Ok(projects)
}
