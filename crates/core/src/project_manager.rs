//! High-level project interface
//!
//! The [`ProjectManager`] is the primary entry point for front ends. It loads
//! a project's configuration, resolves its task graph once, and then lists,
//! selects and runs tasks.
//!
//! ## Example
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
//! let task = manager.load_task(Some("check"), &TaskOverrides::default())?;
//! let success = manager.run_task(&task, None, false).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::configs::load_project_config;
use crate::execution::Scheduler;
use crate::report::{Reporter, ReporterKind};
use crate::results::TaskInfo;
use crate::tasks::{Task, TaskGraph};
use crate::types::{WerrError, WerrResult};

/// Configuration for initializing a project manager
pub struct ProjectManagerConfig {
    pub project_root: PathBuf,
}

/// Command-line choices that replace a task's configured settings
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskOverrides {
    pub reporter: Option<ReporterKind>,
    pub parallel: Option<bool>,
}

pub struct ProjectManager {
    name: String,
    root: PathBuf,
    default_task: Option<String>,
    graph: TaskGraph,
}

impl ProjectManager {
    /// Load the project's configuration and resolve its task graph
    pub fn new(config: ProjectManagerConfig) -> WerrResult<Self> {
        let project = load_project_config(&config.project_root)?;
        let graph = TaskGraph::resolve(project.tasks, &project.dashname)?;
        debug!("Loaded {} tasks for project '{}'", graph.len(), project.name);

        Ok(Self {
            name: project.name,
            root: project.root,
            default_task: project.default_task,
            graph,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Every task in configuration order
    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        self.graph.tasks().map(TaskInfo::from).collect()
    }

    /// Select a task by name, or the default task, with overrides applied.
    ///
    /// The default is `default.task` when configured, else the first task.
    pub fn load_task(&self, name: Option<&str>, overrides: &TaskOverrides) -> WerrResult<Task> {
        let name = name.or(self.default_task.as_deref());
        let task = match name {
            Some(name) => self
                .graph
                .get(name)
                .ok_or_else(|| WerrError::UnknownTask(name.to_string()))?,
            None => self
                .graph
                .first()
                .ok_or_else(|| WerrError::Config("no tasks configured".to_string()))?,
        };

        Ok(task.with_overrides(overrides.reporter, overrides.parallel))
    }

    /// Run `task` and the tasks it needs, reporting to stdout
    pub async fn run_task(
        &self,
        task: &Task,
        name_filter: Option<&str>,
        force_serial: bool,
    ) -> WerrResult<bool> {
        self.run_task_with_reporter(task, name_filter, force_serial, task.reporter.build())
            .await
    }

    /// Run `task` and the tasks it needs through the given reporter.
    ///
    /// The project banner is the first thing reported.
    pub async fn run_task_with_reporter(
        &self,
        task: &Task,
        name_filter: Option<&str>,
        force_serial: bool,
        reporter: Box<dyn Reporter>,
    ) -> WerrResult<bool> {
        let mut scheduler =
            Scheduler::new(&self.graph, &self.root, reporter).force_serial(force_serial);
        scheduler
            .reporter_mut()
            .emit_info(&format!("Project: {} ({})", self.name, task.name));
        scheduler.run(task, name_filter).await
    }
}
