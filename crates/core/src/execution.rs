//! Task execution module
//!
//! This module handles the actual execution of tasks: the command model,
//! the serial/concurrent command executor, dependency validation and the
//! scheduler that walks a task's dependency chain.

pub mod command;
pub mod dependencies;
pub mod executor;
pub mod runner;

pub use command::{Command, CommandLine, CommandResult};
pub use executor::{filter_commands, CommandExecutor, MAX_WORKERS};
pub use runner::{run_tree, run_tree_with_reporter, Scheduler, TaskState};
