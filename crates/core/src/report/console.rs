//! Interactive console reporter
//!
//! Each command gets a pending status line when it starts. When it ends, that
//! line is rewritten in place with a pass or fail glyph and its duration.
//! Commands may end out of order, so every pending line tracks how far it
//! sits above the bottom of the output. A result is paired with its line by
//! the position the command was started at, since one task may list the same
//! command twice.

use std::time::Instant;

use colored::*;

use super::{plural, write_line, write_raw, Reporter, ReporterKind, Sink};
use crate::execution::{Command, CommandResult};
use crate::results::TaskInfo;

/// Indent applied to captured output in the failure section
const OUTPUT_INDENT: &str = "      ";

const CURSOR_SAVE: &str = "\x1b7";
const CURSOR_RESTORE: &str = "\x1b8";
const CLEAR_LINE: &str = "\r\x1b[K";

/// A status line still waiting for its command to finish
struct PendingLine {
    command: Command,
    position: usize,
    /// Lines between this one and the cursor, counting itself
    offset: usize,
}

pub struct ConsoleReporter {
    out: Sink,
    pending: Vec<PendingLine>,
    /// Commands started since the last summary
    start_count: usize,
    started: Option<Instant>,
}

impl ConsoleReporter {
    pub fn new(out: Sink) -> Self {
        Self {
            out,
            pending: Vec::new(),
            start_count: 0,
            started: None,
        }
    }

    /// Print below everything else, moving pending lines further up
    fn print_line(&mut self, line: &str) {
        write_line(&mut self.out, line);
        let printed = 1 + line.matches('\n').count();
        for pending in &mut self.pending {
            pending.offset += printed;
        }
    }

    fn status_line(glyph: ColoredString, name: &str) -> String {
        format!("  {} {:<20} ", glyph, name)
    }

    fn finished_line(result: &CommandResult) -> String {
        let glyph = if result.success() {
            "+".green()
        } else {
            "x".red()
        };
        let duration = format!("({:.2}s)", result.duration.as_secs_f64());
        format!(
            "{}{}",
            Self::status_line(glyph, &result.command.name()),
            duration.cyan()
        )
    }
}

impl Reporter for ConsoleReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Cli
    }

    fn emit_task(&mut self, task: &TaskInfo) {
        let mut suffix = if task.parallel {
            " (parallel)".to_string()
        } else if task.reporter == ReporterKind::Live {
            " (live)".to_string()
        } else {
            String::new()
        };
        if let Some(needs) = &task.needs {
            suffix.push_str(&format!(" -> {}", needs.green()));
        }

        self.print_line(&format!("{}{}", task.name.bold().green(), suffix.cyan()));
        for command in &task.commands {
            self.print_line(&format!("  {}", command.rendered().bright_black()));
        }
    }

    fn emit_info(&mut self, msg: &str) {
        self.print_line(msg);
    }

    fn emit_start(&mut self, command: &Command) {
        self.started.get_or_insert_with(Instant::now);

        self.print_line(&Self::status_line("o".yellow(), &command.name()));
        self.pending.push(PendingLine {
            command: command.clone(),
            position: self.start_count,
            offset: 1,
        });
        self.start_count += 1;
    }

    fn emit_end(&mut self, result: &CommandResult) {
        let line = Self::finished_line(result);
        let same_command = |pending: &PendingLine| pending.command == result.command;
        let Some(index) = self
            .pending
            .iter()
            .position(|pending| same_command(pending) && pending.position == result.position)
            .or_else(|| self.pending.iter().position(same_command))
        else {
            self.print_line(&line);
            return;
        };

        let pending = self.pending.remove(index);
        write_raw(
            &mut self.out,
            &format!(
                "{CURSOR_SAVE}\x1b[{}A{CLEAR_LINE}{line}\n{CURSOR_RESTORE}",
                pending.offset
            ),
        );
    }

    fn emit_summary(&mut self, results: &[CommandResult]) {
        self.start_count = 0;
        let elapsed = self
            .started
            .take()
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or_default();
        let failures: Vec<&CommandResult> = results.iter().filter(|r| !r.success()).collect();
        let passed = results.len() - failures.len();

        let msg = format!(
            "Ran {} check{} in {:.2} secs, {} Passed, {} Failed",
            results.len(),
            plural(results.len()),
            elapsed,
            passed,
            failures.len()
        );
        let msg = if failures.is_empty() {
            msg.green()
        } else {
            msg.red()
        };
        self.print_line(&msg.to_string());

        if failures.is_empty() {
            return;
        }
        self.print_line("\nFailures:\n---------");
        for result in failures {
            self.print_line(&Self::finished_line(result));
            self.print_line("");
            for line in indent(&result.output, OUTPUT_INDENT).lines() {
                self.print_line(line);
            }
        }
    }
}

/// Prefix every line that has visible content
fn indent(text: &str, prefix: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}
