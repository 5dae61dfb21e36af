//! Result types for workspace operations
//!
//! This module contains the result types returned by workspace manager operations,
//! including the outcome of a dispatch run.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::configs::tasks::TaskKind;

/// Exit code for a missing required project directory
pub const EXIT_MISSING_DIRECTORY: i32 = 1;
/// Exit code when a script exceeds its timeout, as used by coreutils `timeout`
pub const EXIT_TIMED_OUT: i32 = 124;
/// Exit code when the run is interrupted
pub const EXIT_CANCELLED: i32 = 130;

/// Why a run stopped early
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DispatchFailure {
    MissingRequiredDirectory { path: PathBuf },
    ChildProcessFailure { exit_code: i32 },
    TimedOut { after: Duration },
    Cancelled,
}

impl DispatchFailure {
    /// Process exit code the run reports for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchFailure::MissingRequiredDirectory { .. } => EXIT_MISSING_DIRECTORY,
            DispatchFailure::ChildProcessFailure { exit_code } => *exit_code,
            DispatchFailure::TimedOut { .. } => EXIT_TIMED_OUT,
            DispatchFailure::Cancelled => EXIT_CANCELLED,
        }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchFailure::MissingRequiredDirectory { path } => {
                write!(f, "missing required directory {}", path.display())
            }
            DispatchFailure::ChildProcessFailure { exit_code } => {
                write!(f, "exited with code {}", exit_code)
            }
            DispatchFailure::TimedOut { after } => {
                write!(f, "timed out after {}s", after.as_secs_f64())
            }
            DispatchFailure::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StepStatus {
    Succeeded,
    Failed { exit_code: i32 },
    TimedOut,
    Cancelled,
    SkippedMissingDirectory,
    SkippedMissingScript,
}

impl StepStatus {
    pub fn was_invoked(&self) -> bool {
        matches!(
            self,
            StepStatus::Succeeded
                | StepStatus::Failed { .. }
                | StepStatus::TimedOut
                | StepStatus::Cancelled
        )
    }
}

/// What happened to one project during a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub project: String,
    pub status: StepStatus,
    pub duration: Duration,
}

/// Outcome of one dispatch run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub kind: TaskKind,
    pub exit_code: i32,
    pub failed_project: Option<String>,
    pub failure: Option<DispatchFailure>,
    /// Visited projects in order; projects after a failure are absent
    pub steps: Vec<StepReport>,
}

impl RunResult {
    pub fn succeeded(kind: TaskKind, steps: Vec<StepReport>) -> Self {
        Self {
            kind,
            exit_code: 0,
            failed_project: None,
            failure: None,
            steps,
        }
    }

    pub fn failed(
        kind: TaskKind,
        project: &str,
        failure: DispatchFailure,
        steps: Vec<StepReport>,
    ) -> Self {
        Self {
            kind,
            exit_code: failure.exit_code(),
            failed_project: Some(project.to_string()),
            failure: Some(failure),
            steps,
        }
    }

    /// Run stopped between projects; no project is to blame
    pub fn cancelled(kind: TaskKind, steps: Vec<StepReport>) -> Self {
        let failure = DispatchFailure::Cancelled;
        Self {
            kind,
            exit_code: failure.exit_code(),
            failed_project: None,
            failure: Some(failure),
            steps,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Names of the projects whose script or command was started
    pub fn invoked_projects(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.status.was_invoked())
            .map(|step| step.project.as_str())
            .collect()
    }
}

/// Information about a configured or discovered project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub path: PathBuf,
    pub required: bool,
    pub exists: bool,
    /// Kinds with a `scripts/<kind>.<ext>` file present
    pub scripts: Vec<TaskKind>,
    /// Kinds with a configured command
    pub commands: Vec<TaskKind>,
}

/// Result of listing projects in the workspace
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListResult {
    pub workspace_name: Option<String>,
    pub projects: Vec<ProjectInfo>,
}
