//! Shared plumbing for the `sweep` binary and the `run-*` entry points

use std::path::{Path, PathBuf};

use anyhow::Result;
use sweep_core::workspace::find_workspace_root;
use sweep_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
use sweep_core::TaskKind;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Send diagnostics to stderr; `RUST_LOG` wins over `verbose`
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Token tripped by the first Ctrl-C
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling run");
            trigger.cancel();
        }
    });
    cancel
}

pub fn load_manager(start: &Path) -> Result<WorkspaceManager> {
    WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_root: start.to_path_buf(),
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize workspace: {}", e))
}

/// Where an entry point starts looking for the workspace: the current
/// directory when it is inside one, otherwise the directory holding the
/// binary (e.g. `<root>/bin/run-test` started from elsewhere)
pub fn entry_point_start(cwd: &Path, exe: Option<&Path>) -> PathBuf {
    if find_workspace_root(cwd).is_ok() {
        return cwd.to_path_buf();
    }
    match exe.and_then(Path::parent) {
        Some(exe_dir) if find_workspace_root(exe_dir).is_ok() => {
            tracing::debug!(dir = %exe_dir.display(), "using workspace around the binary");
            exe_dir.to_path_buf()
        }
        _ => cwd.to_path_buf(),
    }
}

/// Body of the argument-less `run-<kind>` binaries: dispatch `kind` over the
/// workspace around the current directory or the binary, and return the exit code
pub async fn run_entry_point(kind: TaskKind) -> Result<i32> {
    init_tracing(false);
    let cwd = std::env::current_dir()?;
    let exe = std::env::current_exe().ok();
    let manager = load_manager(&entry_point_start(&cwd, exe.as_deref()))?;
    commands::run::execute(&manager, kind.as_str(), None).await
}
