//! Line-delimited JSON reporter
//!
//! Each completed command becomes one self-contained JSON object on its own
//! line. Nothing is printed on start or in the summary.

use serde::Serialize;

use super::{strip_ansi, write_line, Reporter, ReporterKind, Sink};
use crate::execution::CommandResult;
use crate::results::TaskInfo;

#[derive(Serialize)]
struct CommandRecord {
    task: String,
    command: String,
    duration: f64,
    output: String,
    success: bool,
}

#[derive(Serialize)]
struct TaskRecord<'a> {
    task: &'a str,
    reporter: &'a str,
    parallel: bool,
    command: String,
    needs: Vec<&'a str>,
}

pub struct JsonReporter {
    out: Sink,
}

impl JsonReporter {
    pub fn new(out: Sink) -> Self {
        Self { out }
    }

    fn write_record<T: Serialize>(&mut self, record: &T) {
        match serde_json::to_string(record) {
            Ok(line) => write_line(&mut self.out, &line),
            Err(e) => tracing::warn!("Failed to serialize report record: {}", e),
        }
    }
}

impl Reporter for JsonReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Json
    }

    fn emit_task(&mut self, task: &TaskInfo) {
        for command in &task.commands {
            let record = TaskRecord {
                task: &task.name,
                reporter: task.reporter.as_str(),
                parallel: task.parallel,
                command: command.rendered(),
                needs: task.needs.iter().map(String::as_str).collect(),
            };
            self.write_record(&record);
        }
    }

    fn emit_end(&mut self, result: &CommandResult) {
        let record = CommandRecord {
            task: result.command.name(),
            command: result.command.rendered(),
            duration: result.duration.as_secs_f64(),
            output: strip_ansi(&result.output),
            success: result.success(),
        };
        self.write_record(&record);
    }
}
