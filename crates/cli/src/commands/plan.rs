use anyhow::Result;
use colored::*;
use sweep_core::task_execution::StepAction;
use sweep_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, target: &str, json: bool) -> Result<()> {
    let plan = manager
        .get_execution_plan(target)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{} {}", "Execution plan for".bold(), target.cyan());

    if let Some(step) = plan.missing_required() {
        println!(
            "{} {}",
            "Error:".red().bold(),
            format!(
                "required directory for '{}' is missing ({}); nothing would run",
                step.project,
                step.project_dir.display()
            )
            .red()
        );
    }

    println!("\n{}:", "Execution order".bold());
    for (i, step) in plan.steps.iter().enumerate() {
        let label = format!("{}:{}", step.project, plan.kind);
        match &step.action {
            StepAction::Invoke { invocation } => {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    label,
                    invocation.command_line().dimmed()
                );
            }
            StepAction::SkipMissingScript { script } => {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    label,
                    format!("skipped, no {}", script.display()).yellow()
                );
            }
            StepAction::SkipMissingDirectory => {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    label,
                    "skipped, optional directory missing".yellow()
                );
            }
            StepAction::MissingRequiredDirectory => {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    label,
                    "required directory missing".red()
                );
            }
        }
    }

    Ok(())
}
