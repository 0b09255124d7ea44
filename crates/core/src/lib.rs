//! Werr Core Library
//!
//! This is the core library for the werr project task runner. A project
//! declares named tasks, each a list of commands, in its `pyproject.toml`.
//! werr runs a task after the chain of tasks it needs and reports the outcome
//! of every command in one of several output formats.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`project_manager`] - High-level project interface
//! - [`configs`] - `pyproject.toml` loading and variable substitution
//! - [`tasks`] - Tasks and the validated task graph
//! - [`execution`] - Commands, the command executor and the scheduler
//! - [`report`] - Console, live, JUnit XML and JSON reporters
//! - [`results`] - Result types for project operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`ProjectManager`]:
//!
//! ```rust,no_run
//! use werr_core::project_manager::{ProjectManager, ProjectManagerConfig, TaskOverrides};
//! use std::path::PathBuf;
//!
//! # async fn example() -> werr_core::types::WerrResult<()> {
//! let manager = ProjectManager::new(ProjectManagerConfig {
//!     project_root: PathBuf::from("."),
//! })?;
//!
//! for task in manager.list_tasks() {
//!     println!("{}", task.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod execution;
pub mod project_manager;
pub mod report;
pub mod results;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use project_manager::{ProjectManager, ProjectManagerConfig, TaskOverrides};
pub use types::{WerrError, WerrResult};
