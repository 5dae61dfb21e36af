use anyhow::Result;
use colored::*;
use sweep_core::output::get_project_color;
use sweep_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, json: bool) -> Result<()> {
    let result = manager.list_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let heading = match &result.workspace_name {
        Some(name) => format!("Projects ({})", name),
        None => "Projects".to_string(),
    };
    println!("{}", heading.bold().underline());

    if result.projects.is_empty() {
        println!("  {}", "No projects found".dimmed());
        return Ok(());
    }

    // Dispatch order, not alphabetical
    for project in &result.projects {
        let name = project.name.color(get_project_color(&project.name)).bold();
        let requirement = if project.required {
            "required".normal()
        } else {
            "optional".dimmed()
        };

        if !project.exists {
            println!(
                "{} {} {}",
                name,
                requirement,
                format!("missing: {}", project.path.display()).red()
            );
            continue;
        }

        let mut tasks: Vec<String> = project.scripts.iter().map(|k| k.to_string()).collect();
        tasks.extend(project.commands.iter().map(|k| format!("{} (command)", k)));
        let tasks = if tasks.is_empty() {
            "no tasks".dimmed()
        } else {
            tasks.join(", ").normal()
        };

        println!("{} {} {}", name, requirement, tasks);
    }

    Ok(())
}
