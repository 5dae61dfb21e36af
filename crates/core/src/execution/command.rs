//! Process invocation
//!
//! The dispatcher never spawns processes itself; it hands an [`Invocation`] to an
//! [`Invoker`]. [`ProcessInvoker`] is the real implementation, tests substitute
//! their own.

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::types::{SweepError, SweepResult};

/// A fully resolved external command for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub project: String,
    pub program: String,
    pub args: Vec<String>,
    /// `None` inherits the caller's working directory
    pub working_dir: Option<PathBuf>,
    /// Added on top of the inherited environment
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Command line for display, arguments with spaces quoted
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    Exited(i32),
    TimedOut(Duration),
    Cancelled,
}

/// Runs one invocation to completion.
///
/// Implementations must not return before the process has terminated, and
/// must stop it when `timeout` elapses or `cancel` fires.
pub trait Invoker {
    fn invoke(
        &self,
        invocation: &Invocation,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = SweepResult<InvocationStatus>>;
}

/// Spawns real child processes that share the caller's stdout and stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

enum Waited {
    Exited(ExitStatus),
    TimedOut(Duration),
    Cancelled,
}

impl Invoker for ProcessInvoker {
    async fn invoke(
        &self,
        invocation: &Invocation,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> SweepResult<InvocationStatus> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).kill_on_drop(true);
        // Own process group, so a timeout or cancel reaches grandchildren too
        #[cfg(unix)]
        command.process_group(0);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        tracing::debug!(
            project = %invocation.project,
            command = %invocation.command_line(),
            "spawning"
        );

        let mut child = command.spawn().map_err(|source| SweepError::Spawn {
            project: invocation.project.clone(),
            program: invocation.program.clone(),
            source,
        })?;
        let pid = child.id();

        let waited = {
            let wait = async {
                match timeout {
                    Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                        Ok(status) => status.map(Waited::Exited),
                        Err(_) => Ok(Waited::TimedOut(limit)),
                    },
                    None => child.wait().await.map(Waited::Exited),
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Waited::Cancelled,
                waited = wait => waited?,
            }
        };

        match waited {
            Waited::Exited(status) => Ok(InvocationStatus::Exited(exit_code(status))),
            Waited::TimedOut(limit) => {
                stop_child(&mut child, pid, &invocation.project).await;
                Ok(InvocationStatus::TimedOut(limit))
            }
            Waited::Cancelled => {
                stop_child(&mut child, pid, &invocation.project).await;
                Ok(InvocationStatus::Cancelled)
            }
        }
    }
}

async fn stop_child(child: &mut tokio::process::Child, pid: Option<u32>, project: &str) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::warn!(project = %project, "failed to kill process group {}: {}", pid, e);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        tracing::warn!(project = %project, "failed to kill child process: {}", e);
    }
}

/// Exit code of a finished process; signal deaths map to `128 + signal` on unix
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(project: &str, script: &str) -> Invocation {
        Invocation {
            project: project.to_string(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: None,
            env: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_exit_code_is_propagated_unchanged() {
        let cancel = CancellationToken::new();
        let status = ProcessInvoker
            .invoke(&sh("a", "exit 0"), None, &cancel)
            .await
            .unwrap();
        assert_eq!(status, InvocationStatus::Exited(0));

        let status = ProcessInvoker
            .invoke(&sh("a", "exit 42"), None, &cancel)
            .await
            .unwrap();
        assert_eq!(status, InvocationStatus::Exited(42));
    }

    #[tokio::test]
    async fn test_env_and_working_dir_are_applied() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut invocation = sh(
            "a",
            "test \"$SWEEP_PROJECT\" = a && test -f marker",
        );
        invocation.working_dir = Some(temp_dir.path().to_path_buf());
        invocation.env = vec![("SWEEP_PROJECT".to_string(), "a".to_string())];
        std::fs::write(temp_dir.path().join("marker"), "").unwrap();

        let status = ProcessInvoker
            .invoke(&invocation, None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status, InvocationStatus::Exited(0));
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let limit = Duration::from_millis(100);
        let started = std::time::Instant::now();
        let status = ProcessInvoker
            .invoke(&sh("slow", "sleep 10"), Some(limit), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status, InvocationStatus::TimedOut(limit));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_timeout_kills_grandchildren() {
        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("late");
        let script = format!("sh -c 'sleep 1; touch \"{}\"'; echo done", marker.display());

        let status = ProcessInvoker
            .invoke(
                &sh("nested", &script),
                Some(Duration::from_millis(200)),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(matches!(status, InvocationStatus::TimedOut(_)));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_cancellation_kills_child() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let status = ProcessInvoker
            .invoke(&sh("slow", "sleep 10"), None, &cancel)
            .await
            .unwrap();
        assert_eq!(status, InvocationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let invocation = Invocation {
            project: "a".to_string(),
            program: "sweep-definitely-not-a-program".to_string(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
        };
        let err = ProcessInvoker
            .invoke(&invocation, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::Spawn { .. }));
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let invocation = sh("a", "echo hi");
        assert_eq!(invocation.command_line(), "sh -c \"echo hi\"");
    }
}
