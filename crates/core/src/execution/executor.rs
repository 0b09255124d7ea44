//! Command executor
//!
//! Runs the command list of one task, either strictly one after another or
//! concurrently on a bounded pool, and drives the reporter's start, end and
//! summary events. Every reporter call happens on the calling task, so
//! reporters never see concurrent calls.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::debug;

use crate::execution::command::{Command, CommandResult};
use crate::report::Reporter;
use crate::tasks::Concurrency;
use crate::types::{WerrError, WerrResult};

/// Upper bound on commands running at the same time
pub const MAX_WORKERS: usize = 8;

/// Restrict commands to those matching `filter`.
///
/// An exact display name match wins; otherwise every command whose display
/// name starts with `filter` is selected.
pub fn filter_commands(commands: &[Command], filter: Option<&str>) -> WerrResult<Vec<Command>> {
    let Some(filter) = filter else {
        return Ok(commands.to_vec());
    };

    let mut selected: Vec<Command> = commands
        .iter()
        .filter(|c| c.name() == filter)
        .cloned()
        .collect();
    if selected.is_empty() {
        selected = commands
            .iter()
            .filter(|c| c.name().starts_with(filter))
            .cloned()
            .collect();
    }
    if selected.is_empty() {
        return Err(WerrError::NoMatchingCommands {
            filter: filter.to_string(),
            available: commands.iter().map(Command::name).collect(),
        });
    }
    Ok(selected)
}

/// Runs command lists against one working directory
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    working_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run every command and report on it.
    ///
    /// Returns true if every command succeeded. The summary is emitted once,
    /// with results in the order the commands were given.
    pub async fn execute(
        &self,
        commands: &[Command],
        concurrency: Concurrency,
        reporter: &mut dyn Reporter,
    ) -> WerrResult<bool> {
        let live = !reporter.captures_output();
        let results = match concurrency {
            Concurrency::Serial => self.execute_serial(commands, live, reporter).await?,
            Concurrency::Parallel => self.execute_parallel(commands, live, reporter).await?,
        };

        reporter.emit_summary(&results);
        Ok(results.iter().all(CommandResult::success))
    }

    async fn execute_serial(
        &self,
        commands: &[Command],
        live: bool,
        reporter: &mut dyn Reporter,
    ) -> WerrResult<Vec<CommandResult>> {
        let mut results = Vec::with_capacity(commands.len());
        for (position, command) in commands.iter().enumerate() {
            reporter.emit_start(command);
            let result = self.spawn(command.clone(), live).await?.with_position(position);
            reporter.emit_end(&result);
            results.push(result);
        }
        Ok(results)
    }

    async fn execute_parallel(
        &self,
        commands: &[Command],
        live: bool,
        reporter: &mut dyn Reporter,
    ) -> WerrResult<Vec<CommandResult>> {
        // Announce everything up front so a live display can show all of it.
        for command in commands {
            reporter.emit_start(command);
        }

        let workers = commands.len().min(MAX_WORKERS);
        debug!("Running {} commands on {} workers", commands.len(), workers);

        let mut queue = commands.iter().cloned().enumerate();
        let mut join_set = JoinSet::new();
        let mut results: Vec<(usize, CommandResult)> = Vec::with_capacity(commands.len());

        for (index, command) in queue.by_ref().take(workers) {
            self.spawn_indexed(&mut join_set, index, command, live);
        }

        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined
                .map_err(|e| WerrError::Task(format!("Command execution panicked: {}", e)))?;
            reporter.emit_end(&result);
            results.push((index, result));

            if let Some((index, command)) = queue.next() {
                self.spawn_indexed(&mut join_set, index, command, live);
            }
        }

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, result)| result).collect())
    }

    fn spawn_indexed(
        &self,
        join_set: &mut JoinSet<(usize, CommandResult)>,
        index: usize,
        command: Command,
        live: bool,
    ) {
        let cwd = self.working_dir.clone();
        join_set.spawn_blocking(move || (index, command.run(&cwd, live).with_position(index)));
    }

    async fn spawn(&self, command: Command, live: bool) -> WerrResult<CommandResult> {
        let cwd = self.working_dir.clone();
        tokio::task::spawn_blocking(move || command.run(&cwd, live))
            .await
            .map_err(|e| WerrError::Task(format!("Command execution panicked: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::{Event, RecordingReporter};
    use crate::report::{ReporterKind, Sink};

    fn sh(script: &str) -> Command {
        Command::argv(["sh", "-c", script])
    }

    fn named(name: &str) -> Command {
        Command::argv([name])
    }

    #[test]
    fn test_filter_prefers_exact_match() {
        let commands = vec![
            Command::argv(["ruff", "check"]).with_dashname(),
            Command::argv(["ruff", "format"]).with_dashname(),
            named("pytest"),
        ];

        let selected = filter_commands(&commands, Some("pytest")).unwrap();
        assert_eq!(selected, vec![named("pytest")]);
    }

    #[test]
    fn test_filter_falls_back_to_prefix() {
        let commands = vec![
            Command::argv(["ruff", "check"]).with_dashname(),
            Command::argv(["ruff", "format"]).with_dashname(),
            named("pytest"),
        ];

        let selected = filter_commands(&commands, Some("ruff")).unwrap();
        let names: Vec<String> = selected.iter().map(Command::name).collect();
        assert_eq!(names, vec!["ruff-check", "ruff-format"]);
    }

    #[test]
    fn test_filter_exact_match_excludes_longer_names() {
        let commands = vec![named("py"), Command::argv(["py", "test"]).with_dashname()];

        let selected = filter_commands(&commands, Some("py")).unwrap();
        assert_eq!(selected, vec![named("py")]);
    }

    #[test]
    fn test_filter_without_match_lists_available() {
        let commands = vec![named("ruff"), named("pytest")];

        let err = filter_commands(&commands, Some("mypy")).unwrap_err();
        match err {
            WerrError::NoMatchingCommands { filter, available } => {
                assert_eq!(filter, "mypy");
                assert_eq!(available, vec!["ruff", "pytest"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let commands = vec![named("ruff"), named("pytest")];
        assert_eq!(filter_commands(&commands, None).unwrap(), commands);
    }

    #[tokio::test]
    async fn test_serial_interleaves_start_and_end() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, events) = RecordingReporter::new(true);
        let commands = vec![named("true"), named("false"), named("true")];

        let ok = CommandExecutor::new(dir.path())
            .execute(&commands, Concurrency::Serial, &mut reporter)
            .await
            .unwrap();

        assert!(!ok);
        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                Event::Start("true".into()),
                Event::End("true".into(), true),
                Event::Start("false".into()),
                Event::End("false".into(), false),
                Event::Start("true".into()),
                Event::End("true".into(), true),
                Event::Summary(vec!["true".into(), "false".into(), "true".into()]),
            ]
        );
    }

    #[tokio::test]
    async fn test_serial_runs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, _events) = RecordingReporter::new(true);
        let commands = vec![
            sh("echo one >> order.txt"),
            sh("echo two >> order.txt"),
            sh("echo three >> order.txt"),
        ];

        let ok = CommandExecutor::new(dir.path())
            .execute(&commands, Concurrency::Serial, &mut reporter)
            .await
            .unwrap();

        assert!(ok);
        let order = std::fs::read_to_string(dir.path().join("order.txt")).unwrap();
        assert_eq!(order, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_parallel_announces_all_before_any_end() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, events) = RecordingReporter::new(true);
        let commands: Vec<Command> = (0..12)
            .map(|i| sh(&format!("sleep 0.0{}", i % 5)))
            .collect();

        let ok = CommandExecutor::new(dir.path())
            .execute(&commands, Concurrency::Parallel, &mut reporter)
            .await
            .unwrap();

        assert!(ok);
        let events = events.lock().unwrap().clone();
        let first_end = events
            .iter()
            .position(|e| matches!(e, Event::End(..)))
            .unwrap();
        assert_eq!(first_end, commands.len());
        assert!(events[..first_end]
            .iter()
            .all(|e| matches!(e, Event::Start(_))));

        let ends = events
            .iter()
            .filter(|e| matches!(e, Event::End(..)))
            .count();
        assert_eq!(ends, commands.len());
        assert!(matches!(events.last(), Some(Event::Summary(names)) if names.len() == 12));
    }

    #[tokio::test]
    async fn test_parallel_reports_in_completion_order() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, events) = RecordingReporter::new(true);
        let slow = sh("sleep 0.5; exit 1");
        let fast = Command::argv(["true"]);

        let ok = CommandExecutor::new(dir.path())
            .execute(&[slow.clone(), fast.clone()], Concurrency::Parallel, &mut reporter)
            .await
            .unwrap();

        assert!(!ok);
        let events = events.lock().unwrap().clone();
        assert_eq!(events[2], Event::End(fast.name(), true));
        assert_eq!(events[3], Event::End(slow.name(), false));
        // The summary keeps the original order
        assert_eq!(events[4], Event::Summary(vec![slow.name(), fast.name()]));
    }

    #[tokio::test]
    async fn test_parallel_pool_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, _events) = RecordingReporter::new(true);
        // Each command records the number of running siblings it can see.
        let script =
            "touch running.$$; ls running.* | wc -l >> seen.txt; sleep 0.2; rm running.$$";
        let commands: Vec<Command> = (0..(MAX_WORKERS * 2)).map(|_| sh(script)).collect();

        CommandExecutor::new(dir.path())
            .execute(&commands, Concurrency::Parallel, &mut reporter)
            .await
            .unwrap();

        let seen = std::fs::read_to_string(dir.path().join("seen.txt")).unwrap();
        let max_seen = seen
            .lines()
            .filter_map(|l| l.trim().parse::<usize>().ok())
            .max()
            .unwrap();
        assert!(max_seen <= MAX_WORKERS);
        assert_eq!(seen.lines().count(), MAX_WORKERS * 2);
    }

    #[tokio::test]
    async fn test_results_carry_their_start_position() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, _events) = RecordingReporter::new(true);
        let commands = vec![sh("sleep 0.3"), named("true"), named("true")];
        let executor = CommandExecutor::new(dir.path());

        let parallel = executor.execute_parallel(&commands, false, &mut reporter).await.unwrap();
        let serial = executor.execute_serial(&commands, false, &mut reporter).await.unwrap();

        for results in [parallel, serial] {
            let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
            assert_eq!(positions, vec![0, 1, 2]);
        }
    }

    #[tokio::test]
    async fn test_live_reporter_disables_capture() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, _events) = RecordingReporter::new(false);
        let results = CommandExecutor::new(dir.path())
            .execute_serial(&[named("true")], true, &mut reporter)
            .await
            .unwrap();

        assert!(results[0].output.is_empty());
        assert!(!reporter.captures_output());
    }

    #[tokio::test]
    async fn test_spawn_failure_flows_through_reporting() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, events) = RecordingReporter::new(true);
        let missing = named("werr-test-no-such-program");

        let ok = CommandExecutor::new(dir.path())
            .execute(&[missing.clone()], Concurrency::Serial, &mut reporter)
            .await
            .unwrap();

        assert!(!ok);
        let events = events.lock().unwrap().clone();
        assert_eq!(events[1], Event::End(missing.name(), false));
    }

    #[tokio::test]
    async fn test_empty_command_list_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reporter, events) = RecordingReporter::new(true);

        for concurrency in [Concurrency::Serial, Concurrency::Parallel] {
            let ok = CommandExecutor::new(dir.path())
                .execute(&[], concurrency, &mut reporter)
                .await
                .unwrap();
            assert!(ok);
        }
        assert_eq!(
            events.lock().unwrap().clone(),
            vec![Event::Summary(vec![]), Event::Summary(vec![])]
        );
    }

    #[tokio::test]
    async fn test_json_reporter_records_every_command() {
        use crate::report::testing::SharedBuffer;

        let dir = tempfile::tempdir().unwrap();
        let buffer = SharedBuffer::default();
        let sink: Sink = buffer.sink();
        let mut reporter = ReporterKind::Json.build_with_sink(sink);
        let commands = vec![
            Command::argv(["printf", "\\033[31mred\\033[0m"]),
            Command::argv(["false"]),
        ];

        CommandExecutor::new(dir.path())
            .execute(&commands, Concurrency::Parallel, reporter.as_mut())
            .await
            .unwrap();

        let records: Vec<serde_json::Value> = buffer
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        let printf = records.iter().find(|r| r["task"] == "printf").unwrap();
        assert_eq!(printf["output"], "red");
        assert_eq!(printf["success"], true);
        let failed = records.iter().find(|r| r["task"] == "false").unwrap();
        assert_eq!(failed["success"], false);
    }
}
