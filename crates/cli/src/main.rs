use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sweep_cli::{commands, init_tracing, load_manager};

/// Sweep - run format, validate and test scripts across sub-projects
#[derive(Parser)]
#[command(name = "sweep")]
#[command(about = "Run per-project maintenance scripts across a repository")]
#[command(version)]
struct Cli {
    /// Directory inside the workspace (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Kill a script that runs longer than this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task
    Run {
        /// Target in format "project:kind" or just "kind" for all projects
        target: String,
    },
    /// Show what a task would run without running it
    Plan {
        /// Target in format "project:kind" or just "kind" for all projects
        target: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// List projects in the workspace
    List {
        /// Print the project list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON schema of the workspace config file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    let manager = load_manager(&cli.workspace)?;

    match cli.command {
        Commands::Run { target } => {
            let timeout = cli.timeout.map(Duration::from_secs);
            let code = commands::run::execute(&manager, &target, timeout).await?;
            std::process::exit(code)
        }
        Commands::Plan { target, json } => commands::plan::execute(&manager, &target, json),
        Commands::List { json } => commands::list::execute(&manager, json),
        Commands::Schema => commands::schema::execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_accepted_before_and_after_subcommand() {
        let before = Cli::try_parse_from(["sweep", "--timeout", "5", "run", "test"]).unwrap();
        assert_eq!(before.timeout, Some(5));

        let after = Cli::try_parse_from(["sweep", "run", "test", "--timeout", "7"]).unwrap();
        assert_eq!(after.timeout, Some(7));
        assert!(matches!(after.command, Commands::Run { ref target } if target == "test"));
    }

    #[test]
    fn test_timeout_is_optional() {
        let cli = Cli::try_parse_from(["sweep", "plan", "validate"]).unwrap();
        assert_eq!(cli.timeout, None);
    }
}
