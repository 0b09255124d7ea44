use anyhow::Result;
use tracing::debug;
use werr_core::project_manager::{ProjectManager, TaskOverrides};

/// Run a task and the tasks it needs. Returns whether every command passed.
pub async fn execute(
    manager: &ProjectManager,
    task: Option<&str>,
    overrides: &TaskOverrides,
    name_filter: Option<&str>,
    verbose: bool,
) -> Result<bool> {
    let task = manager
        .load_task(task, overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load task: {}", e))?;

    if verbose && task.concurrency.is_parallel() {
        debug!("Running '{}' serially so log output stays readable", task.name);
    }

    let success = manager
        .run_task(&task, name_filter, verbose)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run task '{}': {}", task.name, e))?;

    Ok(success)
}
