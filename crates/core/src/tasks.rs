//! Tasks and the task graph
//!
//! A [`Task`] is a named list of commands that may need one other task to run
//! first. [`TaskGraph::resolve`] validates a collection of tasks: every `needs`
//! reference must exist and the references must not form a cycle.

use std::collections::HashMap;

use petgraph::prelude::*;
use tracing::debug;

use crate::execution::dependencies::find_cycle;
use crate::execution::Command;
use crate::report::ReporterKind;
use crate::types::{WerrError, WerrResult};

/// How the commands of one task are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    #[default]
    Serial,
    Parallel,
}

impl Concurrency {
    pub fn is_parallel(&self) -> bool {
        matches!(self, Concurrency::Parallel)
    }
}

impl From<bool> for Concurrency {
    fn from(parallel: bool) -> Self {
        if parallel {
            Concurrency::Parallel
        } else {
            Concurrency::Serial
        }
    }
}

/// A configured task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub commands: Vec<Command>,
    pub concurrency: Concurrency,
    pub reporter: ReporterKind,
    pub needs: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            commands,
            concurrency: Concurrency::Serial,
            reporter: ReporterKind::Cli,
            needs: None,
        }
    }

    pub fn with_needs(mut self, needs: impl Into<String>) -> Self {
        self.needs = Some(needs.into());
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_reporter(mut self, reporter: ReporterKind) -> Self {
        self.reporter = reporter;
        self
    }

    /// A copy of this task with command-line overrides applied
    pub fn with_overrides(&self, reporter: Option<ReporterKind>, parallel: Option<bool>) -> Self {
        Self {
            reporter: reporter.unwrap_or(self.reporter),
            concurrency: parallel.map(Concurrency::from).unwrap_or(self.concurrency),
            ..self.clone()
        }
    }
}

/// Give colliding commands two-token names.
///
/// A command keeps its one-token name unless another command in the list
/// shares its base tool, or its base tool is listed in `always`.
pub fn disambiguate(commands: Vec<Command>, always: &[String]) -> Vec<Command> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for command in &commands {
        *counts.entry(command.base_name()).or_default() += 1;
    }

    commands
        .into_iter()
        .map(|command| {
            let base = command.base_name();
            let collides = counts.get(&base).copied().unwrap_or_default() > 1;
            if collides || always.contains(&base) {
                let renamed = command.with_dashname();
                debug!("Naming command '{}' as '{}'", base, renamed.name());
                renamed
            } else {
                command
            }
        })
        .collect()
}

/// A validated collection of tasks, in configuration order
#[derive(Debug, Default)]
pub struct TaskGraph {
    graph: DiGraph<Task, ()>,
    index: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    /// Validate tasks and link each one to the task it needs.
    ///
    /// Commands are disambiguated as described on [`disambiguate`].
    pub fn resolve(tasks: Vec<Task>, always_dashname: &[String]) -> WerrResult<Self> {
        let mut graph = DiGraph::<Task, ()>::new();
        let mut index = HashMap::new();

        for mut task in tasks {
            if index.contains_key(&task.name) {
                return Err(WerrError::Config(format!(
                    "Task '{}' is defined more than once",
                    task.name
                )));
            }
            task.commands = disambiguate(std::mem::take(&mut task.commands), always_dashname);
            let name = task.name.clone();
            index.insert(name, graph.add_node(task));
        }

        let mut edges = Vec::new();
        for node in graph.node_indices() {
            let task = &graph[node];
            if let Some(needs) = &task.needs {
                let Some(&dep) = index.get(needs) else {
                    return Err(WerrError::UnknownDependency {
                        task: task.name.clone(),
                        missing: needs.clone(),
                    });
                };
                // Edge: task -> dependency (dependency runs first)
                edges.push((node, dep));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        if let Some(cycle) = find_cycle(&graph) {
            let names = cycle.into_iter().map(|node| graph[node].name.clone()).collect();
            return Err(WerrError::DependencyCycle(names));
        }

        Ok(Self { graph, index })
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    /// All tasks in configuration order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.graph.node_weights()
    }

    pub fn first(&self) -> Option<&Task> {
        self.tasks().next()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// The tasks `task` transitively needs, the first one to run first.
    ///
    /// `task` itself may be a modified copy of a graph task, so its `needs`
    /// is looked up by name rather than through the graph.
    pub fn dependency_chain(&self, task: &Task) -> WerrResult<Vec<&Task>> {
        let mut chain: Vec<&Task> = Vec::new();
        let mut current = task;
        while let Some(needs) = &current.needs {
            let dep = self.get(needs).ok_or_else(|| WerrError::UnknownDependency {
                task: current.name.clone(),
                missing: needs.clone(),
            })?;
            if dep.name == task.name || chain.iter().any(|t| t.name == dep.name) {
                let mut names: Vec<String> = std::iter::once(task.name.clone())
                    .chain(chain.iter().map(|t| t.name.clone()))
                    .collect();
                names.push(dep.name.clone());
                return Err(WerrError::DependencyCycle(names));
            }
            chain.push(dep);
            current = dep;
        }
        chain.reverse();
        Ok(chain)
    }
}
