use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::*;
use sweep_core::execution::ProcessInvoker;
use sweep_core::output::print_summary;
use sweep_core::workspace_manager::WorkspaceManager;

use crate::cancel_on_ctrl_c;

/// Run the target and return the exit code the process should end with
pub async fn execute(
    manager: &WorkspaceManager,
    target: &str,
    timeout: Option<Duration>,
) -> Result<i32> {
    if timeout == Some(Duration::ZERO) {
        anyhow::bail!("--timeout must be greater than zero");
    }

    println!(
        "{} {} {}",
        "Running".bold(),
        target.cyan(),
        format!("in {}", manager.workspace.root.display()).dimmed()
    );
    println!();

    let options = manager.dispatch_options(timeout, cancel_on_ctrl_c());
    let result = manager
        .run_task(target, &ProcessInvoker, options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run '{}': {}", target, e))?;

    print_summary(&result);
    std::io::stdout().flush()?;

    Ok(result.exit_code)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::load_manager;

    fn workspace_with_exit_codes(codes: &[(&str, i32)]) -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let mut config = String::from("projects:\n");
        for (name, code) in codes {
            config.push_str(&format!("  - name: {name}\n    path: libs/{name}\n"));
            let scripts = root.join("libs").join(name).join("scripts");
            std::fs::create_dir_all(&scripts).unwrap();
            std::fs::write(scripts.join("validate.sh"), format!("exit {code}\n")).unwrap();
        }
        std::fs::write(root.join("sweep.yml"), config).unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_execute_returns_first_failing_exit_code() {
        let temp_dir = workspace_with_exit_codes(&[("a", 0), ("b", 3), ("c", 4)]);
        let manager = load_manager(temp_dir.path()).unwrap();

        let code = execute(&manager, "validate", None).await.unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn test_execute_single_project_target() {
        let temp_dir = workspace_with_exit_codes(&[("a", 0), ("b", 3)]);
        let manager = load_manager(temp_dir.path()).unwrap();

        let code = execute(&manager, "a:validate", None).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_execute_rejects_zero_timeout() {
        let temp_dir = workspace_with_exit_codes(&[("a", 0)]);
        let manager = load_manager(temp_dir.path()).unwrap();

        assert!(execute(&manager, "validate", Some(Duration::ZERO))
            .await
            .is_err());
    }
}
