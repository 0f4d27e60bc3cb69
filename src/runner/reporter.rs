//! Reporting of per-test lifecycle events.
//!
//! The runner pushes events through the [`Reporter`] trait in execution
//! order; implementations format them however they like. Two are provided:
//! the indented console format and a JSON-lines stream. Reporting is
//! fire-and-forget — a reporter cannot fail the run.

use std::io::Write;

/// Receives per-test lifecycle events, in execution order.
pub trait Reporter {
    /// A new test document is about to run.
    fn start_suite(&mut self, name: &str);

    /// A subtest passed.
    fn pass(&mut self, message: &str);

    /// A subtest (or the harness itself) failed.
    fn fail(&mut self, message: &str);

    /// Diagnostic detail for the most recent failure.
    fn report_stack(&mut self, stack: &str);
}

/// Console reporter: suite headers, check/cross markers, indented stacks.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Disable ANSI colors (markers stay).
    pub plain: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            format!("{code}{text}\x1b[0m")
        }
    }
}

impl Reporter for ConsoleReporter {
    fn start_suite(&mut self, name: &str) {
        println!("# {name}\n");
    }

    fn pass(&mut self, message: &str) {
        println!(
            "{}",
            indent(&self.paint("\x1b[32m", &format!("\u{221a} {message}")), 2)
        );
    }

    fn fail(&mut self, message: &str) {
        println!(
            "{}",
            indent(&self.paint("\x1b[31m", &format!("\u{d7} {message}")), 2)
        );
    }

    fn report_stack(&mut self, stack: &str) {
        println!("{}", indent(stack, 4));
    }
}

/// Prefix every line of `text` with `times` spaces.
fn indent(text: &str, times: usize) -> String {
    let prefix = " ".repeat(times);
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON-lines reporter: one event object per line on the given writer.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: serde_json::Value) {
        // Fire-and-forget; a broken pipe must not fail the run.
        let _ = writeln!(self.out, "{event}");
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn start_suite(&mut self, name: &str) {
        self.emit(serde_json::json!({ "event": "suite", "name": name }));
    }

    fn pass(&mut self, message: &str) {
        self.emit(serde_json::json!({ "event": "pass", "message": message }));
    }

    fn fail(&mut self, message: &str) {
        self.emit(serde_json::json!({ "event": "fail", "message": message }));
    }

    fn report_stack(&mut self, stack: &str) {
        self.emit(serde_json::json!({ "event": "stack", "stack": stack }));
    }
}

/// Reporter that records events for inspection; used by tests and callers
/// that post-process a run.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<ReporterEvent>,
}

/// One recorded reporter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    Suite(String),
    Pass(String),
    Fail(String),
    Stack(String),
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suites(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReporterEvent::Suite(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReporterEvent::Fail(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn start_suite(&mut self, name: &str) {
        self.events.push(ReporterEvent::Suite(name.to_string()));
    }

    fn pass(&mut self, message: &str) {
        self.events.push(ReporterEvent::Pass(message.to_string()));
    }

    fn fail(&mut self, message: &str) {
        self.events.push(ReporterEvent::Fail(message.to_string()));
    }

    fn report_stack(&mut self, stack: &str) {
        self.events.push(ReporterEvent::Stack(stack.to_string()));
    }
}

// ============================================================================
// TESTS
// ============================================================================
