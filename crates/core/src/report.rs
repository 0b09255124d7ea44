//! Reporting of task and command lifecycle events
//!
//! Every output format implements the [`Reporter`] trait. The variant is
//! chosen once, by [`ReporterKind`], and the same instance then receives every
//! event of one top-level invocation, including the events of the tasks the
//! target depends on.

pub mod console;
pub mod json;
pub mod junit;
pub mod live;

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::execution::{Command, CommandResult};
use crate::results::TaskInfo;
use crate::types::WerrError;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use junit::JunitReporter;
pub use live::LiveReporter;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ANSI escape pattern is valid")
});

/// Remove terminal color and cursor escape sequences from captured output
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Where a reporter writes its output
pub type Sink = Box<dyn Write + Send>;

/// A sink for the events emitted while tasks run.
///
/// The default implementation of each method prints nothing; variants
/// override the events they care about. All calls are made from a single
/// coordinating task, in the order described on each method.
pub trait Reporter: Send {
    fn kind(&self) -> ReporterKind;

    /// Whether command output should be captured. When false, children write
    /// straight to the terminal and results carry no output.
    fn captures_output(&self) -> bool {
        true
    }

    /// Describe a configured task (used by `--list`).
    fn emit_task(&mut self, _task: &TaskInfo) {}

    /// A message for an interactive reader.
    fn emit_info(&mut self, _msg: &str) {}

    /// Called before a command begins.
    fn emit_start(&mut self, _command: &Command) {}

    /// Called after a command completes.
    fn emit_end(&mut self, _result: &CommandResult) {}

    /// Called once after every command of a task has completed.
    fn emit_summary(&mut self, _results: &[CommandResult]) {}
}

/// The closed set of output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReporterKind {
    #[default]
    Cli,
    Live,
    Xml,
    Json,
}

impl ReporterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReporterKind::Cli => "cli",
            ReporterKind::Live => "live",
            ReporterKind::Xml => "xml",
            ReporterKind::Json => "json",
        }
    }

    /// Build a reporter writing to stdout
    pub fn build(self) -> Box<dyn Reporter> {
        self.build_with_sink(Box::new(io::stdout()))
    }

    pub fn build_with_sink(self, sink: Sink) -> Box<dyn Reporter> {
        match self {
            ReporterKind::Cli => Box::new(ConsoleReporter::new(sink)),
            ReporterKind::Live => Box::new(LiveReporter::new(sink)),
            ReporterKind::Xml => Box::new(JunitReporter::new(sink)),
            ReporterKind::Json => Box::new(JsonReporter::new(sink)),
        }
    }
}

impl FromStr for ReporterKind {
    type Err = WerrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cli" => Ok(ReporterKind::Cli),
            "live" => Ok(ReporterKind::Live),
            "xml" => Ok(ReporterKind::Xml),
            "json" => Ok(ReporterKind::Json),
            other => Err(WerrError::UnknownReporter(other.to_string())),
        }
    }
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write one line to a sink, logging rather than failing on a closed stream
pub(crate) fn write_line(sink: &mut Sink, line: &str) {
    if let Err(e) = writeln!(sink, "{line}").and_then(|_| sink.flush()) {
        warn!("Failed to write report output: {}", e);
    }
}

/// Write without a trailing newline
pub(crate) fn write_raw(sink: &mut Sink, text: &str) {
    if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
        warn!("Failed to write report output: {}", e);
    }
}

/// "s" unless there is exactly one
pub(crate) fn plural(size: usize) -> &'static str {
    if size == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::{Reporter, ReporterKind};
    use crate::execution::{Command, CommandResult};

    /// A cloneable in-memory sink so tests can read back what was reported
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
            String::from_utf8_lossy(&bytes).into_owned()
        }

        pub fn sink(&self) -> super::Sink {
            Box::new(self.clone())
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| io::Error::other("poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        Info(String),
        Start(String),
        End(String, bool),
        Summary(Vec<String>),
    }

    /// Records every event by command display name
    pub struct RecordingReporter {
        events: Arc<Mutex<Vec<Event>>>,
        capture: bool,
    }

    impl RecordingReporter {
        /// With `capture` unset the reporter asks for live output
        pub fn new(capture: bool) -> (Self, Arc<Mutex<Vec<Event>>>) {
            let events = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    events: Arc::clone(&events),
                    capture,
                },
                events,
            )
        }

        fn push(&self, event: Event) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }

    impl Reporter for RecordingReporter {
        fn kind(&self) -> ReporterKind {
            ReporterKind::Cli
        }

        fn captures_output(&self) -> bool {
            self.capture
        }

        fn emit_info(&mut self, msg: &str) {
            self.push(Event::Info(msg.to_string()));
        }

        fn emit_start(&mut self, command: &Command) {
            self.push(Event::Start(command.name()));
        }

        fn emit_end(&mut self, result: &CommandResult) {
            self.push(Event::End(result.command.name(), result.success()));
        }

        fn emit_summary(&mut self, results: &[CommandResult]) {
            self.push(Event::Summary(
                results.iter().map(|r| r.command.name()).collect(),
            ));
        }
    }

    pub fn make_result(name: &str, success: bool, output: &str) -> CommandResult {
        CommandResult::new(
            Command::argv([name]),
            if success { 0 } else { 1 },
            Duration::from_millis(500),
            output.to_string(),
        )
    }
}
