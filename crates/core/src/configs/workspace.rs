use std::collections::HashSet;
use std::path::{Component, Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::project::ProjectConfig;
use crate::types::{SweepError, SweepResult};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Sub-projects in dispatch order.
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    /// Glob patterns for directories discovered as optional projects, appended after `projects`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discover: Vec<String>,
    /// Glob patterns for paths to exclude from discovery.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    /// Extension of per-project scripts. Defaults to `sh`, or `bat` on Windows.
    pub script_extension: Option<String>,
    /// Program and leading arguments used to run a script, e.g. `["bash", "-e"]`.
    pub interpreter: Option<Vec<String>>,
    /// Upper bound for a single script run.
    pub timeout_secs: Option<u64>,
}

impl WorkspaceConfig {
    /// Reject configurations the dispatcher cannot run unambiguously.
    pub fn validate(&self) -> SweepResult<()> {
        let mut seen = HashSet::new();
        for project in &self.projects {
            if project.name.trim().is_empty() {
                return Err(SweepError::Config(format!(
                    "Project at path '{}' has an empty name",
                    project.path
                )));
            }
            if !seen.insert(project.name.as_str()) {
                return Err(SweepError::Config(format!(
                    "Duplicate project name '{}'",
                    project.name
                )));
            }
            if !is_contained_path(&project.path) {
                return Err(SweepError::Config(format!(
                    "Path '{}' of project '{}' must be relative and stay inside the workspace",
                    project.path, project.name
                )));
            }
        }

        if let Some(interpreter) = &self.interpreter {
            if interpreter.is_empty() {
                return Err(SweepError::Config(
                    "interpreter must name at least a program".to_string(),
                ));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(SweepError::Config(
                "timeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Relative, without `..`, and not rooted with either separator
fn is_contained_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return false;
    }
    Path::new(path).components().all(|component| {
        matches!(component, Component::Normal(_) | Component::CurDir)
    })
}

pub fn parse_workspace_config(yaml_str: &str) -> SweepResult<WorkspaceConfig> {
    let config: WorkspaceConfig = serde_yaml::from_str(yaml_str)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_workspace_config_toml(toml_str: &str) -> SweepResult<WorkspaceConfig> {
    let config: WorkspaceConfig = toml::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

/// JSON schema of the workspace config file, pretty-printed
pub fn workspace_config_schema() -> SweepResult<String> {
    let schema = schemars::schema_for!(WorkspaceConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::tasks::{Command, TaskKind};

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
name: agno
projects:
  - name: agno
    path: libs/agno
  - name: agno_os
    path: libs/agno_os
    required: false
    commands:
      validate: [ruff, check, "{dir}"]
timeoutSecs: 600
"#;
        let config = parse_workspace_config(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("agno"));
        assert_eq!(config.projects.len(), 2);
        assert!(config.projects[0].required, "required should default to true");
        assert!(!config.projects[1].required);
        assert_eq!(
            config.projects[1].command_for(TaskKind::Validate),
            Some(&Command::Multiple(vec![
                "ruff".to_string(),
                "check".to_string(),
                "{dir}".to_string()
            ]))
        );
        assert_eq!(config.timeout_secs, Some(600));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
scriptExtension = "bash"

[[projects]]
name = "core"
path = "libs/core"

[[projects]]
name = "docs"
path = "docs"
required = false
"#;
        let config = parse_workspace_config_toml(toml_str).unwrap();
        assert_eq!(config.script_extension.as_deref(), Some("bash"));
        assert_eq!(config.projects[1].name, "docs");
        assert!(!config.projects[1].required);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "projects: []\nparallel: true\n";
        assert!(matches!(
            parse_workspace_config(yaml),
            Err(SweepError::Yaml(_))
        ));
    }

    #[test]
    fn test_duplicate_project_names_rejected() {
        let yaml = r#"
projects:
  - name: a
    path: one
  - name: a
    path: two
"#;
        let err = parse_workspace_config(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate project name 'a'"));
    }

    #[test]
    fn test_schema_lists_config_fields() {
        let schema = workspace_config_schema().unwrap();
        assert!(schema.contains("projects"));
        assert!(schema.contains("timeoutSecs"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse_workspace_config("timeoutSecs: 0\n").unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }

    #[test]
    fn test_project_paths_must_stay_inside_workspace() {
        for path in ["/etc", "../sibling", "libs/../../outside", "\\\\server\\share"] {
            let yaml = format!("projects:\n  - name: a\n    path: '{path}'\n");
            let err = parse_workspace_config(&yaml).unwrap_err();
            assert!(
                matches!(err, SweepError::Config(ref msg) if msg.contains("inside the workspace")),
                "{path} was accepted"
            );
        }
    }

    #[test]
    fn test_nested_and_current_dir_paths_accepted() {
        let config =
            parse_workspace_config("projects:\n  - name: a\n    path: ./libs/a\n  - name: root\n    path: .\n")
                .unwrap();
        assert_eq!(config.projects.len(), 2);
    }
}
