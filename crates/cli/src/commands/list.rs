use werr_core::project_manager::ProjectManager;
use werr_core::report::ReporterKind;

/// Print every configured task, as JSON lines with `--json`, else for the console
pub fn execute(manager: &ProjectManager, output: Option<ReporterKind>) {
    let kind = match output {
        Some(ReporterKind::Json) => ReporterKind::Json,
        _ => ReporterKind::Cli,
    };
    let mut reporter = kind.build();

    for task in manager.list_tasks() {
        reporter.emit_task(&task);
    }
}
