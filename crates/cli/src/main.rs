use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use werr_core::project_manager::{ProjectManager, ProjectManagerConfig, TaskOverrides};
use werr_core::report::ReporterKind;

mod commands;

/// Werr - A simple python project task runner
#[derive(Parser, Debug)]
#[command(name = "werr")]
#[command(about = "A simple python project task runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Python project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// List available tasks and exit (combines with --json)
    #[arg(short, long)]
    list: bool,

    /// Run task commands in parallel
    #[arg(short = 'x', long = "execute-parallel", conflicts_with = "serial")]
    execute_parallel: bool,

    /// Run task commands serially
    #[arg(long)]
    serial: bool,

    /// Name of command to filter by (runs a single tool)
    #[arg(short, long)]
    name: Option<String>,

    #[command(flatten)]
    output: OutputFormat,

    /// Task to run (defaults to `default.task`, else the first task in the config)
    task: Option<String>,
}

/// Output format selection. The task's configured reporter is used when none is given.
#[derive(Args, Debug)]
#[group(multiple = false)]
struct OutputFormat {
    /// Print results to the console (default)
    #[arg(long)]
    cli: bool,
    /// Print command output to the console (no results)
    #[arg(long)]
    live: bool,
    /// Print results as JUnit XML
    #[arg(long)]
    xml: bool,
    /// Print results as lines of JSON
    #[arg(long)]
    json: bool,
}

impl OutputFormat {
    fn reporter(&self) -> Option<ReporterKind> {
        if self.cli {
            Some(ReporterKind::Cli)
        } else if self.live {
            Some(ReporterKind::Live)
        } else if self.xml {
            Some(ReporterKind::Xml)
        } else if self.json {
            Some(ReporterKind::Json)
        } else {
            None
        }
    }
}

impl Cli {
    fn parallel(&self) -> Option<bool> {
        if self.execute_parallel {
            Some(true)
        } else if self.serial {
            Some(false)
        } else {
            None
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Called with arguments: {:?}", cli);

    let manager = ProjectManager::new(ProjectManagerConfig {
        project_root: cli.project.clone(),
    })
    .map_err(|e| anyhow::anyhow!("Failed to load project: {}", e))?;

    if cli.list {
        commands::list::execute(&manager, cli.output.reporter());
        return Ok(());
    }

    let overrides = TaskOverrides {
        reporter: cli.output.reporter(),
        parallel: cli.parallel(),
    };
    let success = commands::run::execute(
        &manager,
        cli.task.as_deref(),
        &overrides,
        cli.name.as_deref(),
        cli.verbose,
    )
    .await?;

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
