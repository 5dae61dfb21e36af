//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary interface
//! for all workspace operations: locating and loading the workspace, listing its
//! projects, planning a task and running it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sweep_core::execution::{DispatchOptions, ProcessInvoker};
//! use sweep_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> sweep_core::types::SweepResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//! })?;
//!
//! // Show what `validate` would do
//! let plan = manager.get_execution_plan("validate")?;
//!
//! // Run the tests of every project
//! let options = manager.dispatch_options(None, Default::default());
//! let result = manager.run_task("test", &ProcessInvoker, options).await?;
//! std::process::exit(result.exit_code);
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::configs::tasks::TaskKind;
use crate::execution::command::Invoker;
use crate::execution::runner::{DispatchOptions, Dispatcher};
use crate::results::{ProjectInfo, ProjectListResult, RunResult};
use crate::task_execution::{
    parse_target, resolve_task_execution_plan, ScriptSettings, TaskExecutionPlan, SCRIPTS_DIR,
};
use crate::types::SweepResult;
use crate::workspace::{find_workspace_root, Workspace};

/// High-level workspace manager that encapsulates all workspace operations
pub struct WorkspaceManager {
    pub workspace: Workspace,
}

/// Configuration for initializing a workspace manager
pub struct WorkspaceManagerConfig {
    /// Directory to start looking for the workspace config from
    pub workspace_root: PathBuf,
}

impl WorkspaceManager {
    /// Locate the workspace at or above the given directory and load it
    pub fn new(config: WorkspaceManagerConfig) -> SweepResult<Self> {
        let root = find_workspace_root(&config.workspace_root)?;
        tracing::debug!("Using workspace root {}", root.display());
        let workspace = Workspace::load(&root)?;
        Ok(Self { workspace })
    }

    /// List all projects in dispatch order with the scripts they carry
    pub fn list_projects(&self) -> SweepResult<ProjectListResult> {
        let settings = ScriptSettings::for_workspace(&self.workspace);

        let projects = self
            .workspace
            .projects
            .iter()
            .map(|project| {
                let dir = self.workspace.project_dir(project);
                let scripts = TaskKind::ALL
                    .into_iter()
                    .filter(|kind| {
                        dir.join(SCRIPTS_DIR)
                            .join(kind.script_file_name(&settings.extension))
                            .is_file()
                    })
                    .collect();
                ProjectInfo {
                    name: project.name.clone(),
                    exists: dir.is_dir(),
                    path: dir,
                    required: project.required,
                    scripts,
                    commands: project.commands.keys().copied().collect(),
                }
            })
            .collect();

        Ok(ProjectListResult {
            workspace_name: self.workspace.config.name.clone(),
            projects,
        })
    }

    /// Get execution plan for a target (`kind` or `project:kind`)
    pub fn get_execution_plan(&self, target: &str) -> SweepResult<TaskExecutionPlan> {
        let (project_filter, kind) = parse_target(target)?;
        resolve_task_execution_plan(&self.workspace, kind, project_filter.as_deref())
    }

    /// Dispatch options from the workspace config; `timeout` overrides `timeoutSecs`
    pub fn dispatch_options(
        &self,
        timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> DispatchOptions {
        DispatchOptions {
            timeout: timeout.or_else(|| self.workspace.config.timeout_secs.map(Duration::from_secs)),
            cancel,
        }
    }

    /// Execute a target on the workspace
    pub async fn run_task<I: Invoker>(
        &self,
        target: &str,
        invoker: &I,
        options: DispatchOptions,
    ) -> SweepResult<RunResult> {
        let plan = self.get_execution_plan(target)?;
        Dispatcher::new(invoker, options).run(&plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace_fixture() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::write(
            root.join("sweep.yml"),
            r#"
name: fixture
timeoutSecs: 30
projects:
  - name: agno
    path: libs/agno
  - name: docs
    path: docs
    required: false
    commands:
      format: "echo formatting"
scriptExtension: sh
"#,
        )
        .unwrap();
        let scripts = root.join("libs/agno/scripts");
        std::fs::create_dir_all(&scripts).unwrap();
        std::fs::write(scripts.join("test.sh"), "exit 0\n").unwrap();
        std::fs::write(scripts.join("format.sh"), "exit 0\n").unwrap();
        temp_dir
    }

    #[test]
    fn test_new_finds_root_from_subdirectory() {
        let temp_dir = workspace_fixture();
        let manager = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: temp_dir.path().join("libs/agno/scripts"),
        })
        .unwrap();
        assert_eq!(manager.workspace.root, temp_dir.path());
    }

    #[test]
    fn test_list_projects() {
        let temp_dir = workspace_fixture();
        let manager = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: temp_dir.path().to_path_buf(),
        })
        .unwrap();

        let result = manager.list_projects().unwrap();
        assert_eq!(result.workspace_name.as_deref(), Some("fixture"));
        assert_eq!(result.projects.len(), 2);

        let agno = &result.projects[0];
        assert!(agno.exists);
        assert_eq!(agno.scripts, vec![TaskKind::Format, TaskKind::Test]);

        let docs = &result.projects[1];
        assert!(!docs.exists);
        assert!(!docs.required);
        assert_eq!(docs.commands, vec![TaskKind::Format]);
    }

    #[test]
    fn test_dispatch_options_prefers_override() {
        let temp_dir = workspace_fixture();
        let manager = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: temp_dir.path().to_path_buf(),
        })
        .unwrap();

        let options = manager.dispatch_options(None, CancellationToken::new());
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));

        let options =
            manager.dispatch_options(Some(Duration::from_secs(5)), CancellationToken::new());
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_execution_plan_for_single_project() {
        let temp_dir = workspace_fixture();
        let manager = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: temp_dir.path().to_path_buf(),
        })
        .unwrap();

        let plan = manager.get_execution_plan("agno:test").unwrap();
        assert_eq!(plan.kind, TaskKind::Test);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.invocations().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_task_skips_missing_optional_project() {
        use crate::execution::command::ProcessInvoker;

        let temp_dir = workspace_fixture();
        let manager = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: temp_dir.path().to_path_buf(),
        })
        .unwrap();

        let options = manager.dispatch_options(None, CancellationToken::new());
        let result = manager
            .run_task("format", &ProcessInvoker, options)
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.invoked_projects(), vec!["agno"]);
    }
}
