//! Passthrough reporter: commands write straight to the terminal.

use super::{write_line, Reporter, ReporterKind, Sink};

pub struct LiveReporter {
    out: Sink,
}

impl LiveReporter {
    pub fn new(out: Sink) -> Self {
        Self { out }
    }
}

impl Reporter for LiveReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Live
    }

    fn captures_output(&self) -> bool {
        false
    }

    fn emit_info(&mut self, msg: &str) {
        write_line(&mut self.out, msg);
    }
}
