//! Result types for project operations
//!
//! This module contains the output structures returned by the
//! [`crate::project_manager::ProjectManager`] and consumed by reporters.

use crate::execution::Command;
use crate::report::ReporterKind;
use crate::tasks::Task;

/// Information about a configured task, as shown by `--list`
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: String,
    pub parallel: bool,
    pub reporter: ReporterKind,
    pub commands: Vec<Command>,
    pub needs: Option<String>,
}

impl From<&Task> for TaskInfo {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            parallel: task.concurrency.is_parallel(),
            reporter: task.reporter,
            commands: task.commands.clone(),
            needs: task.needs.clone(),
        }
    }
}
