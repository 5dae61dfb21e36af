//! Task execution module
//!
//! This module handles running a resolved plan: spawning the per-project
//! commands and stopping at the first failure.

pub mod command;
pub mod runner;

pub use command::{Invocation, InvocationStatus, Invoker, ProcessInvoker};
pub use runner::{dispatch, DispatchOptions, Dispatcher};
