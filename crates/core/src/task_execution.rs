use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::configs::project::ProjectConfig;
use crate::configs::tasks::{Command, TaskKind};
use crate::execution::command::Invocation;
use crate::platform::PlatformInfo;
use crate::types::{SweepError, SweepResult};
use crate::workspace::Workspace;

/// Directory inside each project that holds its task scripts
pub const SCRIPTS_DIR: &str = "scripts";

/// What the dispatcher will do for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum StepAction {
    Invoke { invocation: Invocation },
    SkipMissingDirectory,
    SkipMissingScript { script: PathBuf },
    MissingRequiredDirectory,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    pub project: String,
    pub project_dir: PathBuf,
    pub required: bool,
    pub action: StepAction,
}

/// Result of resolving what a task does in each project, in dispatch order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecutionPlan {
    pub kind: TaskKind,
    pub root: PathBuf,
    pub steps: Vec<PlannedStep>,
    pub project_filter: Option<String>,
}

impl TaskExecutionPlan {
    /// First project whose required directory is missing
    pub fn missing_required(&self) -> Option<&PlannedStep> {
        self.steps
            .iter()
            .find(|step| step.action == StepAction::MissingRequiredDirectory)
    }

    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.steps.iter().filter_map(|step| match &step.action {
            StepAction::Invoke { invocation } => Some(invocation),
            _ => None,
        })
    }
}

/// How scripts are named and launched for a workspace
#[derive(Debug, Clone)]
pub struct ScriptSettings {
    pub extension: String,
    /// Configured interpreter; always used when set
    pub interpreter: Option<Vec<String>>,
    /// Used for scripts that cannot be executed directly
    pub fallback_interpreter: Vec<String>,
    pub shell: Vec<String>,
}

impl ScriptSettings {
    pub fn for_workspace(workspace: &Workspace) -> Self {
        let platform = PlatformInfo::current();
        Self {
            extension: workspace
                .config
                .script_extension
                .clone()
                .unwrap_or_else(|| platform.script_extension.to_string()),
            interpreter: workspace.config.interpreter.clone(),
            fallback_interpreter: platform.interpreter_argv(),
            shell: platform.shell_argv(),
        }
    }
}

/// Split a target of the form `kind` or `project:kind`
pub fn parse_target(target: &str) -> SweepResult<(Option<String>, TaskKind)> {
    match target.split_once(':') {
        Some((project, kind)) => {
            if project.is_empty() {
                return Err(SweepError::Task(format!(
                    "Target '{}' has an empty project name",
                    target
                )));
            }
            Ok((Some(project.to_string()), kind.parse()?))
        }
        None => Ok((None, target.parse()?)),
    }
}

/// Whether the kernel can run `path` itself, honouring its `#!` line
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    false
}

/// Argv running `script`: the configured interpreter, else the script itself
/// when executable, else the platform interpreter
fn script_argv(script: &Path, settings: &ScriptSettings) -> Vec<String> {
    let script_arg = script.to_string_lossy().into_owned();
    let mut argv = match &settings.interpreter {
        Some(interpreter) => interpreter.clone(),
        None if is_executable(script) => return vec![script_arg],
        None => settings.fallback_interpreter.clone(),
    };
    argv.push(script_arg);
    argv
}

fn substitute(arg: &str, root: &Path, project_dir: &Path) -> String {
    arg.replace("{dir}", &project_dir.to_string_lossy())
        .replace("{root}", &root.to_string_lossy())
}

fn split_program(mut argv: Vec<String>, project: &str) -> SweepResult<(String, Vec<String>)> {
    if argv.is_empty() {
        return Err(SweepError::Config(format!(
            "Empty command configured for project '{}'",
            project
        )));
    }
    let program = argv.remove(0);
    Ok((program, argv))
}

/// Resolve the action for a single project
pub fn plan_project(
    root: &Path,
    project: &ProjectConfig,
    kind: TaskKind,
    settings: &ScriptSettings,
) -> SweepResult<PlannedStep> {
    let project_dir = root.join(&project.path);

    let step = |action| PlannedStep {
        project: project.name.clone(),
        project_dir: project_dir.clone(),
        required: project.required,
        action,
    };

    if !project_dir.is_dir() {
        return Ok(step(if project.required {
            StepAction::MissingRequiredDirectory
        } else {
            StepAction::SkipMissingDirectory
        }));
    }

    let argv = match project.command_for(kind) {
        Some(Command::Single(cmd)) => {
            let mut argv = settings.shell.clone();
            argv.push(substitute(cmd, root, &project_dir));
            argv
        }
        Some(Command::Multiple(cmds)) => cmds
            .iter()
            .map(|arg| substitute(arg, root, &project_dir))
            .collect(),
        None => {
            let script = project_dir
                .join(SCRIPTS_DIR)
                .join(kind.script_file_name(&settings.extension));
            if !script.is_file() {
                return Ok(step(StepAction::SkipMissingScript { script }));
            }
            script_argv(&script, settings)
        }
    };

    let (program, args) = split_program(argv, &project.name)?;
    let invocation = Invocation {
        project: project.name.clone(),
        program,
        args,
        working_dir: None,
        env: vec![
            ("SWEEP_ROOT".to_string(), root.to_string_lossy().into_owned()),
            ("SWEEP_PROJECT".to_string(), project.name.clone()),
            (
                "SWEEP_PROJECT_DIR".to_string(),
                project_dir.to_string_lossy().into_owned(),
            ),
            ("SWEEP_TASK".to_string(), kind.to_string()),
        ],
    };

    Ok(step(StepAction::Invoke { invocation }))
}

/// Resolve what `kind` does in every project (or just `project_filter`), in order
pub fn resolve_task_execution_plan(
    workspace: &Workspace,
    kind: TaskKind,
    project_filter: Option<&str>,
) -> SweepResult<TaskExecutionPlan> {
    let projects: Vec<&ProjectConfig> = match project_filter {
        Some(name) => {
            let project = workspace
                .find_project(name)
                .ok_or_else(|| SweepError::Task(format!("Project '{}' not found", name)))?;
            vec![project]
        }
        None => workspace.projects.iter().collect(),
    };

    let settings = ScriptSettings::for_workspace(workspace);
    let steps = projects
        .into_iter()
        .map(|project| plan_project(&workspace.root, project, kind, &settings))
        .collect::<SweepResult<Vec<_>>>()?;

    Ok(TaskExecutionPlan {
        kind,
        root: workspace.root.clone(),
        steps,
        project_filter: project_filter.map(|s| s.to_string()),
    })
}
