//! Configuration parsing for the workspace file and its projects

pub mod project;
pub mod tasks;
pub mod workspace;
