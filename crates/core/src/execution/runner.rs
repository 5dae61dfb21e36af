//! Sequential task dispatcher
//!
//! Walks a [`TaskExecutionPlan`] project by project, one child process at a
//! time, and stops at the first failure.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::configs::project::ProjectConfig;
use crate::configs::tasks::TaskKind;
use crate::configs::workspace::WorkspaceConfig;
use crate::execution::command::{Invocation, InvocationStatus, Invoker};
use crate::output;
use crate::results::{DispatchFailure, RunResult, StepReport, StepStatus};
use crate::task_execution::{
    resolve_task_execution_plan, PlannedStep, StepAction, TaskExecutionPlan,
};
use crate::types::SweepResult;
use crate::workspace::Workspace;

/// Limits applied to every invocation of a run
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Upper bound for a single script; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

/// Runs a plan's invocations strictly in order through an [`Invoker`]
pub struct Dispatcher<'a, I: Invoker> {
    invoker: &'a I,
    options: DispatchOptions,
}

impl<'a, I: Invoker> Dispatcher<'a, I> {
    pub fn new(invoker: &'a I, options: DispatchOptions) -> Self {
        Self { invoker, options }
    }

    /// Execute the plan.
    ///
    /// Missing required directories are checked for every project before
    /// anything is invoked. A non-zero exit stops the run and its code is
    /// returned unchanged.
    pub async fn run(&self, plan: &TaskExecutionPlan) -> SweepResult<RunResult> {
        let kind = plan.kind;

        let steps = match plan
            .steps
            .iter()
            .map(|step| Step::resolve(step, kind))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(steps) => steps,
            Err(step) => {
                let message = format!(
                    "Required directory for project '{}' not found: {}",
                    step.project,
                    step.project_dir.display()
                );
                output::print_error(&message);
                tracing::debug!(project = %step.project, "aborting before any invocation");
                return Ok(RunResult::failed(
                    kind,
                    &step.project,
                    DispatchFailure::MissingRequiredDirectory {
                        path: step.project_dir.clone(),
                    },
                    Vec::new(),
                ));
            }
        };

        let total = steps.len();
        let mut reports = Vec::with_capacity(total);

        for (index, step) in steps.into_iter().enumerate() {
            if self.options.cancel.is_cancelled() {
                output::print_warning("Run cancelled");
                return Ok(RunResult::cancelled(kind, reports));
            }

            let (step, invocation) = match step {
                Step::Invoke { step, invocation } => (step, invocation),
                Step::Skip {
                    project,
                    status,
                    warning,
                } => {
                    output::print_warning(&warning);
                    reports.push(skipped(project, status));
                    continue;
                }
            };

            output::print_heading(
                &format!("[sweep] {}: {} ({}/{})", kind, step.project, index + 1, total),
                &format!("{} {}", kind.verb(), step.project),
                &step.project,
            );

            let started = Instant::now();
            let status = self
                .invoker
                .invoke(invocation, self.options.timeout, &self.options.cancel)
                .await?;
            let duration = started.elapsed();
            tracing::debug!(project = %step.project, ?status, ?duration, "invocation finished");

            let (step_status, failure) = match status {
                InvocationStatus::Exited(0) => (StepStatus::Succeeded, None),
                InvocationStatus::Exited(exit_code) => (
                    StepStatus::Failed { exit_code },
                    Some(DispatchFailure::ChildProcessFailure { exit_code }),
                ),
                InvocationStatus::TimedOut(after) => (
                    StepStatus::TimedOut,
                    Some(DispatchFailure::TimedOut { after }),
                ),
                InvocationStatus::Cancelled => {
                    (StepStatus::Cancelled, Some(DispatchFailure::Cancelled))
                }
            };

            reports.push(StepReport {
                project: step.project.clone(),
                status: step_status,
                duration,
            });

            match failure {
                None => output::print_completion(&step.project),
                Some(failure) => {
                    output::print_error(&format!("{} {} for '{}'", kind, failure, step.project));
                    return Ok(RunResult::failed(kind, &step.project, failure, reports));
                }
            }
        }

        Ok(RunResult::succeeded(kind, reports))
    }
}

/// A planned step the loop can act on without further checks
enum Step<'p> {
    Invoke {
        step: &'p PlannedStep,
        invocation: &'p Invocation,
    },
    Skip {
        project: &'p str,
        status: StepStatus,
        warning: String,
    },
}

impl<'p> Step<'p> {
    /// `Err` carries a project whose required directory is missing
    fn resolve(step: &'p PlannedStep, kind: TaskKind) -> Result<Self, &'p PlannedStep> {
        match &step.action {
            StepAction::Invoke { invocation } => Ok(Step::Invoke { step, invocation }),
            StepAction::SkipMissingDirectory => Ok(Step::Skip {
                project: &step.project,
                status: StepStatus::SkippedMissingDirectory,
                warning: format!(
                    "Directory {} for optional project '{}' not found, skipping",
                    step.project_dir.display(),
                    step.project
                ),
            }),
            StepAction::SkipMissingScript { script } => Ok(Step::Skip {
                project: &step.project,
                status: StepStatus::SkippedMissingScript,
                warning: format!(
                    "No {} script for '{}' at {}, skipping",
                    kind,
                    step.project,
                    script.display()
                ),
            }),
            StepAction::MissingRequiredDirectory => Err(step),
        }
    }
}

fn skipped(project: &str, status: StepStatus) -> StepReport {
    StepReport {
        project: project.to_string(),
        status,
        duration: Duration::ZERO,
    }
}

/// Dispatch `kind` over an explicit project list rooted at `root`
pub async fn dispatch<I: Invoker>(
    invoker: &I,
    root: &Path,
    kind: TaskKind,
    projects: &[ProjectConfig],
    options: DispatchOptions,
) -> SweepResult<RunResult> {
    let config = WorkspaceConfig {
        projects: projects.to_vec(),
        ..Default::default()
    };
    let workspace = Workspace::from_config(root.to_path_buf(), config)?;
    let plan = resolve_task_execution_plan(&workspace, kind, None)?;
    Dispatcher::new(invoker, options).run(&plan).await
}
