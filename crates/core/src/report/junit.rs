//! JUnit-style XML reporter
//!
//! Nothing is written while commands run; the summary renders the whole
//! document at once. Every task ends with its own summary, so running a
//! dependency chain writes one complete document per task, one after another.

use std::fmt::Write as _;
use std::time::Duration;

use super::{strip_ansi, write_raw, Reporter, ReporterKind, Sink};
use crate::execution::CommandResult;

/// Name of the single `testsuite` and the `classname` of every testcase
pub const SUITE_NAME: &str = "werr";

pub struct JunitReporter {
    out: Sink,
}

impl JunitReporter {
    pub fn new(out: Sink) -> Self {
        Self { out }
    }
}

impl Reporter for JunitReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Xml
    }

    fn emit_summary(&mut self, results: &[CommandResult]) {
        let document = render_document(results);
        write_raw(&mut self.out, &document);
    }
}

/// Render the results as a JUnit XML document
pub fn render_document(results: &[CommandResult]) -> String {
    let failures = results.iter().filter(|r| !r.success()).count();
    let duration: Duration = results.iter().map(|r| r.duration).sum();

    let mut suite = Node::new("testsuite")
        .attr("name", SUITE_NAME)
        .attr("tests", results.len())
        .attr("failures", failures)
        .attr("errors", 0)
        .attr("skipped", 0)
        .attr("time", seconds(duration));
    for result in results {
        suite.children.push(testcase(result));
    }

    let root = Node::new("testsuites")
        .attr("tests", results.len())
        .attr("failures", failures)
        .attr("errors", 0)
        .attr("skipped", 0)
        .attr("time", seconds(duration))
        .child(suite);

    let mut document = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    root.render(&mut document, 0);
    document
}

fn testcase(result: &CommandResult) -> Node {
    let node = Node::new("testcase")
        .attr("name", result.command.name())
        .attr("time", seconds(result.duration))
        .attr("classname", SUITE_NAME);
    if result.success() {
        node
    } else {
        node.child(Node::new("failure").text(strip_ansi(&result.output)))
    }
}

fn seconds(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}

/// A minimal XML element
struct Node {
    tag: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn attr(mut self, name: &'static str, value: impl ToString) -> Self {
        self.attributes.push((name, value.to_string()));
        self
    }

    fn text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str(" />\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape(text), self.tag);
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{indent}  {}", escape(text));
                }
                for child in &self.children {
                    child.render(out, depth + 1);
                }
                let _ = writeln!(out, "{indent}</{}>", self.tag);
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
