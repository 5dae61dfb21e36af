//! Console output: step headings, warnings, and project color management
//!
//! Everything printed here is for the operator; none of it is a
//! machine-readable contract.

use colored::*;

use crate::results::{RunResult, StepStatus};

/// Width of the separator rows framing a heading
pub const HEADING_WIDTH: usize = 60;

const SEPARATOR: char = '=';

/// Get a consistent color for a project name
pub fn get_project_color(project_name: &str) -> Color {
    // Use a simple hash of the project name bytes for consistent colors
    let hash = project_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Jewel tones, kept clear of the red/yellow/green used for status
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}

/// Lines of a step heading: banner, blank, separator, centered label, separator, blank
pub fn format_heading(banner: &str, label: &str) -> Vec<String> {
    let separator = SEPARATOR.to_string().repeat(HEADING_WIDTH);
    let centered = format!("{:^width$}", label, width = HEADING_WIDTH)
        .trim_end()
        .to_string();

    vec![
        banner.to_string(),
        String::new(),
        separator.clone(),
        centered,
        separator,
        String::new(),
    ]
}

pub fn print_heading(banner: &str, label: &str, project_name: &str) {
    let color = get_project_color(project_name);
    let lines = format_heading(banner, label);
    println!("{}", lines[0].bold());
    println!();
    println!("{}", lines[2].bright_black());
    println!("{}", lines[3].color(color).bold());
    println!("{}", lines[4].bright_black());
    println!();
}

pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message.red());
}

pub fn print_completion(project_name: &str) {
    println!(
        "{} {}",
        "✓".green().bold(),
        format!("Completed for {}", project_name).color(get_project_color(project_name))
    );
}

/// One line per visited project, then the overall outcome
pub fn print_summary(result: &RunResult) {
    println!();
    println!("{}", format!("Summary ({})", result.kind).bold().underline());

    for step in &result.steps {
        let name = step.project.color(get_project_color(&step.project));
        let elapsed = format!("{:.1}s", step.duration.as_secs_f64()).dimmed();
        match &step.status {
            StepStatus::Succeeded => println!("  {} {} {}", "✓".green().bold(), name, elapsed),
            StepStatus::Failed { exit_code } => println!(
                "  {} {} {} {}",
                "✗".red().bold(),
                name,
                format!("exit code {}", exit_code).red(),
                elapsed
            ),
            StepStatus::TimedOut => {
                println!("  {} {} {} {}", "✗".red().bold(), name, "timed out".red(), elapsed)
            }
            StepStatus::Cancelled => {
                println!("  {} {} {}", "✗".red().bold(), name, "cancelled".red())
            }
            StepStatus::SkippedMissingDirectory => {
                println!("  {} {} {}", "-".dimmed(), name, "directory not found".dimmed())
            }
            StepStatus::SkippedMissingScript => {
                println!("  {} {} {}", "-".dimmed(), name, "no script".dimmed())
            }
        }
    }

    println!();
    match (&result.failure, &result.failed_project) {
        (None, _) => println!("{}", "All projects passed".green().bold()),
        (Some(failure), Some(project)) => println!(
            "{} {}",
            "Failed:".red().bold(),
            format!("{} ({})", project, failure).red()
        ),
        (Some(failure), None) => println!("{} {}", "Failed:".red().bold(), failure.to_string().red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_layout() {
        let lines = format_heading("[sweep] format: agno (1/2)", "Formatting agno");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "[sweep] format: agno (1/2)");
        assert!(lines[1].is_empty());
        assert_eq!(lines[2], "=".repeat(HEADING_WIDTH));
        assert_eq!(lines[4], lines[2]);
        assert!(lines[5].is_empty());
    }

    #[test]
    fn test_heading_label_is_centered() {
        let lines = format_heading("banner", "Testing");
        let label = &lines[3];
        let padding = label.len() - label.trim_start().len();
        assert_eq!(label.trim_start(), "Testing");
        assert_eq!(padding, (HEADING_WIDTH - "Testing".len()) / 2);
    }

    #[test]
    fn test_long_label_is_not_truncated() {
        let long = "x".repeat(HEADING_WIDTH + 5);
        let lines = format_heading("banner", &long);
        assert_eq!(lines[3], long);
    }

    #[test]
    fn test_project_color_is_stable() {
        assert_eq!(get_project_color("agno"), get_project_color("agno"));
    }
}
