//! Sweep Core Library
//!
//! This is the core library for the sweep task dispatcher. It runs one kind of
//! maintenance task (format, validate, test) across the sub-projects of a
//! repository, one project at a time, and stops at the first failure.
//!
//! ## Architecture
//!
//! - [`workspace_manager`] - High-level interface used by the CLI
//! - [`workspace`] - Locating the workspace root, loading config, project discovery
//! - [`task_execution`] - Resolving a task into per-project steps
//! - [`execution`] - The sequential dispatcher and the process invoker
//! - [`configs`] - Configuration parsing for the workspace file and its projects
//! - [`output`] - Headings, warnings and summaries for the operator
//! - [`results`] - Result types, including the outcome of a run
//! - [`platform`] - Per-platform script extension and interpreter
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sweep_core::execution::ProcessInvoker;
//! use sweep_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> sweep_core::types::SweepResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//! })?;
//!
//! let options = manager.dispatch_options(None, Default::default());
//! let result = manager.run_task("validate", &ProcessInvoker, options).await?;
//! assert_eq!(result.exit_code, 0);
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod execution;
pub mod output;
pub mod platform;
pub mod results;
pub mod task_execution;
pub mod types;
pub mod workspace;
pub mod workspace_manager;

// Re-export the main types for easier usage
pub use configs::tasks::TaskKind;
pub use types::{SweepError, SweepResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
