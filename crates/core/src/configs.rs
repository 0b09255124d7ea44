//! Configuration loading
//!
//! Tasks are configured in the `[tool.werr]` table of a project's
//! `pyproject.toml`:
//!
//! ```toml
//! [tool.werr]
//! variable.src = "{project}/src"
//! task.check = ["ruff check {src}", "pytest"]
//! task.fix = [{ needs = "check", shell = true }, "ruff format {src} && ruff check --fix"]
//! ```

pub mod project;
pub mod tasks;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::execution::Command;
use crate::report::ReporterKind;
use crate::tasks::{Concurrency, Task};
use crate::types::{WerrError, WerrResult};
use project::parse_pyproject;
use tasks::parse_task_entries;

pub const PYPROJECT_FILE: &str = "pyproject.toml";

/// Launcher used when `[tool.werr].launcher` is not set
pub const DEFAULT_LAUNCHER: [&str; 2] = ["uv", "run"];

/// Reserved so `default.task` and `task.<name>` cannot be confused
const RESERVED_TASK_NAME: &str = "task";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Everything werr needs from a project's configuration
#[derive(Debug)]
pub struct ProjectConfig {
    pub name: String,
    pub root: PathBuf,
    /// Tasks in file order, commands not yet disambiguated
    pub tasks: Vec<Task>,
    pub default_task: Option<String>,
    pub dashname: Vec<String>,
}

/// Load `<root>/pyproject.toml`
pub fn load_project_config(root: &Path) -> WerrResult<ProjectConfig> {
    let path = root.join(PYPROJECT_FILE);
    if !path.exists() {
        return Err(WerrError::Config(format!(
            "project directory `{}` does not contain a `{}`",
            root.display(),
            PYPROJECT_FILE
        )));
    }
    let root = root.canonicalize()?;
    let content = std::fs::read_to_string(&path)?;
    parse_project_config(&root, &content)
}

/// Parse the contents of a `pyproject.toml` belonging to the project at `root`
pub fn parse_project_config(root: &Path, toml_str: &str) -> WerrResult<ProjectConfig> {
    let pyproject = parse_pyproject(toml_str)?;
    let Some(werr) = pyproject.tool.werr else {
        return Err(WerrError::Config(format!(
            "`{}` does not contain a [tool.werr] section",
            root.join(PYPROJECT_FILE).display()
        )));
    };

    let variables = resolve_variables(root, &werr.variable)?;
    debug!("Variables: {:?}", variables);

    let launcher: Vec<String> = werr
        .launcher
        .unwrap_or_else(|| DEFAULT_LAUNCHER.iter().map(|s| s.to_string()).collect());

    let mut tasks = Vec::with_capacity(werr.task.len());
    for (name, value) in &werr.task {
        if name == RESERVED_TASK_NAME {
            return Err(WerrError::Config(format!(
                "a task cannot be named '{RESERVED_TASK_NAME}'"
            )));
        }
        let (options, raw_commands) = parse_task_entries(name, value)?;

        let commands = raw_commands
            .iter()
            .map(|raw| {
                let rendered = substitute(raw, &variables);
                Command::parse(&rendered, options.shell)
                    .filter(|command| !command.base_name().is_empty())
                    .map(|command| command.with_launcher(launcher.clone()))
                    .ok_or_else(|| {
                        WerrError::Config(format!("`task.{name}` has an invalid command: {raw}"))
                    })
            })
            .collect::<WerrResult<Vec<_>>>()?;

        let reporter = match &options.reporter {
            Some(reporter) => reporter.parse::<ReporterKind>()?,
            None => ReporterKind::default(),
        };

        let mut task = Task::new(name.clone(), commands)
            .with_concurrency(Concurrency::from(options.parallel))
            .with_reporter(reporter);
        if let Some(needs) = options.needs {
            task = task.with_needs(needs);
        }
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(WerrError::Config(
            "[tool.werr] does not contain any `task` lists".to_string(),
        ));
    }

    let name = match pyproject.project.name {
        Some(name) => name,
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Ok(ProjectConfig {
        name,
        root: root.to_path_buf(),
        tasks,
        default_task: werr.default.task,
        dashname: werr.dashname,
    })
}

/// `{project}` plus the configured variables, each rendered with the ones before it
fn resolve_variables(root: &Path, table: &toml::Table) -> WerrResult<HashMap<String, String>> {
    let mut variables = HashMap::new();
    variables.insert("project".to_string(), root.display().to_string());

    for (name, value) in table {
        let template = value.as_str().ok_or_else(|| {
            WerrError::Config(format!("`variable.{name}` must be a string"))
        })?;
        let rendered = substitute(template, &variables);
        variables.insert(name.clone(), rendered);
    }
    Ok(variables)
}

/// Replace `{name}` placeholders, leaving unknown ones as written
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
