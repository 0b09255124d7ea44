//! Task scheduler
//!
//! Runs a target task after the chain of tasks it needs. Each task name ends
//! in a terminal state the first time it runs, and that state is reused for
//! the lifetime of the [`Scheduler`], so a task runs at most once.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::execution::executor::{filter_commands, CommandExecutor};
use crate::execution::Command;
use crate::report::Reporter;
use crate::tasks::{Concurrency, Task, TaskGraph};
use crate::types::WerrResult;

/// Terminal state of a task that has been visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Completed,
    Failed,
}

/// Walks dependency chains and runs each task once.
///
/// Every task reports through the one reporter the scheduler owns, so a chain
/// produces a single continuous report.
pub struct Scheduler<'a> {
    graph: &'a TaskGraph,
    executor: CommandExecutor,
    reporter: Box<dyn Reporter>,
    states: HashMap<String, TaskState>,
    force_serial: bool,
}

impl<'a> Scheduler<'a> {
    pub fn new(graph: &'a TaskGraph, working_dir: &Path, reporter: Box<dyn Reporter>) -> Self {
        Self {
            graph,
            executor: CommandExecutor::new(working_dir),
            reporter,
            states: HashMap::new(),
            force_serial: false,
        }
    }

    /// Run every task serially regardless of its configuration
    pub fn force_serial(mut self, force_serial: bool) -> Self {
        self.force_serial = force_serial;
        self
    }

    pub fn reporter_mut(&mut self) -> &mut dyn Reporter {
        self.reporter.as_mut()
    }

    pub fn state(&self, task_name: &str) -> Option<TaskState> {
        self.states.get(task_name).copied()
    }

    /// Run `target` after the tasks it needs.
    ///
    /// `name_filter` applies to the target's commands only. It is checked
    /// before anything runs. Returns false as soon as a task fails; tasks
    /// that need a failed task are marked failed without running.
    pub async fn run(&mut self, target: &Task, name_filter: Option<&str>) -> WerrResult<bool> {
        match self.state(&target.name) {
            Some(TaskState::Completed) => return Ok(true),
            Some(TaskState::Failed) => return Ok(false),
            None => {}
        }

        let target_commands = filter_commands(&target.commands, name_filter)?;
        let graph = self.graph;
        let chain = graph.dependency_chain(target)?;

        for (position, dep) in chain.iter().enumerate() {
            let succeeded = match self.state(&dep.name) {
                Some(TaskState::Completed) => {
                    debug!("Task '{}' already completed", dep.name);
                    true
                }
                Some(TaskState::Failed) => {
                    debug!("Task '{}' already failed", dep.name);
                    false
                }
                None => self.run_task(&dep.name, &dep.commands, dep.concurrency).await?,
            };

            if !succeeded {
                // Everything above the failed task in the chain is skipped.
                for dependent in chain[position + 1..].iter().map(|t| &t.name) {
                    info!("Skipping task '{}': '{}' failed", dependent, dep.name);
                    self.states.insert(dependent.clone(), TaskState::Failed);
                }
                info!("Skipping task '{}': '{}' failed", target.name, dep.name);
                self.states.insert(target.name.clone(), TaskState::Failed);
                return Ok(false);
            }
        }

        self.run_task(&target.name, &target_commands, target.concurrency).await
    }

    async fn run_task(
        &mut self,
        name: &str,
        commands: &[Command],
        concurrency: Concurrency,
    ) -> WerrResult<bool> {
        let concurrency = if self.force_serial {
            Concurrency::Serial
        } else {
            concurrency
        };
        debug!("Running task '{}' ({:?})", name, concurrency);

        let succeeded = self
            .executor
            .execute(commands, concurrency, self.reporter.as_mut())
            .await?;
        let state = if succeeded {
            TaskState::Completed
        } else {
            TaskState::Failed
        };
        self.states.insert(name.to_string(), state);
        Ok(succeeded)
    }
}

/// Run `target` and its dependency chain with the target's reporter, on stdout.
pub async fn run_tree(
    working_dir: &Path,
    graph: &TaskGraph,
    target: &Task,
    name_filter: Option<&str>,
) -> WerrResult<bool> {
    run_tree_with_reporter(working_dir, graph, target, name_filter, target.reporter.build()).await
}

/// Run `target` and its dependency chain, every task reporting to `reporter`.
pub async fn run_tree_with_reporter(
    working_dir: &Path,
    graph: &TaskGraph,
    target: &Task,
    name_filter: Option<&str>,
    reporter: Box<dyn Reporter>,
) -> WerrResult<bool> {
    Scheduler::new(graph, working_dir, reporter).run(target, name_filter).await
}
