//! Test orchestration: enumerate, filter, execute sequentially, tally.
//!
//! The orchestrator computes the full sorted TestURL list up front, then
//! drives each URL through the engine one at a time — test N+1 never starts
//! before test N's outcome resolves, and at most one execution context is
//! alive. Per-test faults are contained (the loop always advances); only an
//! enumeration failure aborts the run.
//!
//! ## Modules
//!
//! - `engine` - the execution-environment boundary and harness event stream
//! - `reporter` - lifecycle event consumers (console, JSON lines)

pub mod engine;
pub mod reporter;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use thiserror::Error;

use crate::harness::SourceFile;
use crate::server::{ServerError, ServerOptions, TestServer};

use self::engine::{Engine, EventSink, EventStream, HarnessEvent, HarnessStatus, SubtestResult};
use self::reporter::Reporter;

/// Faults that abort the whole run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to enumerate tests under {}: {source}", path.display())]
    Enumeration { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Configuration for [`run_tests`].
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Base directory holding the test tree.
    pub root: PathBuf,
    /// URL prefix the tree is served under (default "/"; normalized to
    /// start and end with "/").
    pub url_base: String,
    /// Location of the harness script, forwarded to the transport surface.
    pub harness_script: Option<PathBuf>,
}

impl RunnerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_base: "/".to_string(),
            harness_script: None,
        }
    }
}

/// Inclusion predicate over (test path, url). May suspend.
///
/// Plain synchronous closures get a blanket implementation.
pub trait TestFilter {
    fn include<'a>(
        &'a self,
        test_path: &'a str,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

impl<F> TestFilter for F
where
    F: Fn(&str, &str) -> bool,
{
    fn include<'a>(
        &'a self,
        test_path: &'a str,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        let verdict = self(test_path, url);
        Box::pin(std::future::ready(verdict))
    }
}

/// Run every applicable test under `options.root` exactly once, in sorted
/// order, and return the cumulative failure count (0 = full success).
///
/// `setup` receives each live engine context before harness wiring.
/// Embedders own the process contract: exit with the returned count.
#[tracing::instrument(skip_all, fields(root = %options.root.display()))]
pub async fn run_tests<E: Engine>(
    engine: &E,
    options: RunnerOptions,
    mut setup: impl FnMut(&mut E::Context) + Send,
    filter: Option<&dyn TestFilter>,
    reporter: &mut dyn Reporter,
) -> Result<u32, RunnerError> {
    let server = TestServer::new(ServerOptions {
        root: options.root.clone(),
        url_base: options.url_base.clone(),
        harness_script: options.harness_script.clone(),
    })?;

    let test_paths = enumerate_test_paths(&options.root)?;
    tracing::debug!(count = test_paths.len(), "enumerated test urls");

    let mut failures: u32 = 0;
    for test_path in &test_paths {
        let url = format!("{}{}", server.url_base(), test_path);

        if let Some(filter) = filter {
            if !filter.include(test_path, &url).await {
                tracing::debug!(test = %test_path, "skipped by filter");
                continue;
            }
        }

        reporter.start_suite(test_path);

        let (sink, mut events) = EventSink::channel();
        match engine.load(&server, &url, &mut setup, sink).await {
            Ok(context) => {
                let failed = drive_document(&mut events, reporter).await;
                // Release the context before advancing; at most one is alive.
                drop(context);
                if failed {
                    failures += 1;
                }
            }
            Err(fault) => {
                tracing::debug!(test = %test_path, error = %fault, "document failed to load");
                reporter.report_stack(fault.report_text());
                failures += 1;
            }
        }
    }

    Ok(failures)
}

/// Enumerate every canonical test URL under `root`, sorted.
///
/// Two runs over an unchanged directory produce an identical sequence.
pub fn enumerate_test_paths(root: &Path) -> Result<Vec<String>, RunnerError> {
    let enumeration = |source| RunnerError::Enumeration {
        path: root.to_path_buf(),
        source,
    };

    let mut rel_files = Vec::new();
    collect_files(root, root, &mut rel_files).map_err(enumeration)?;

    let mut test_paths = Vec::new();
    for rel_path in &rel_files {
        let file = SourceFile::new(root, rel_path);
        test_paths.extend(file.test_paths().map_err(enumeration)?);
    }

    test_paths.sort();
    Ok(test_paths)
}

/// Recursively collect root-relative paths of every file under `dir`.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

/// Await one document's outcome: resolves on the first completion signal or
/// load failure, whichever arrives first. Returns whether the document
/// counts as failed.
async fn drive_document(events: &mut EventStream, reporter: &mut dyn Reporter) -> bool {
    let mut failed = false;
    loop {
        match events.next().await {
            Some(HarnessEvent::Subtest(result)) => {
                if report_subtest(&result, reporter) {
                    failed = true;
                }
            }
            Some(HarnessEvent::Completed(status)) => {
                match status {
                    HarnessStatus::Ok => {}
                    HarnessStatus::Timeout => {
                        reporter.fail("test harness should not timeout");
                        failed = true;
                    }
                    HarnessStatus::Error { message, stack } => {
                        reporter.fail(&format!("test harness error: {message}"));
                        if let Some(stack) = stack {
                            reporter.report_stack(&stack);
                        }
                        failed = true;
                    }
                    HarnessStatus::PreconditionFailed => {
                        reporter.fail("test harness precondition failed");
                        failed = true;
                    }
                }
                break;
            }
            Some(HarnessEvent::LoadFailed { stack }) => {
                reporter.report_stack(&stack);
                failed = true;
                break;
            }
            // Every sink is gone without a completion signal: the engine
            // gave up on the document.
            None => {
                failed = true;
                break;
            }
        }
    }
    failed
}

/// Forward one subtest result; returns whether it marks the document failed.
fn report_subtest(result: &SubtestResult, reporter: &mut dyn Reporter) -> bool {
    if result.status.is_pass() {
        reporter.pass(&result.name);
        return false;
    }

    match result.status.label() {
        Some(label) => reporter.fail(&format!("{} ({label})", result.name)),
        None => reporter.fail(&result.name),
    }

    let mut detail = result.message.clone().unwrap_or_default();
    if let Some(stack) = &result.stack {
        if !detail.is_empty() {
            detail.push('\n');
        }
        detail.push_str(stack);
    }
    if !detail.is_empty() {
        reporter.report_stack(&detail);
    }
    true
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use super::engine::SubtestStatus;
    use super::reporter::{RecordingReporter, ReporterEvent};

    fn subtest(name: &str, status: SubtestStatus) -> SubtestResult {
        SubtestResult {
            name: name.to_string(),
            status,
            message: None,
            stack: None,
        }
    }

    #[tokio::test]
    async fn test_drive_document_all_passing() {
        let (sink, mut events) = EventSink::channel();
        sink.subtest(subtest("one", SubtestStatus::Pass));
        sink.subtest(subtest("two", SubtestStatus::Pass));
        sink.completed(HarnessStatus::Ok);

        let mut reporter = RecordingReporter::new();
        let failed = drive_document(&mut events, &mut reporter).await;
        assert!(!failed);
        assert_eq!(
            reporter.events,
            vec![
                ReporterEvent::Pass("one".to_string()),
                ReporterEvent::Pass("two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_drive_document_one_failure_marks_document() {
        let (sink, mut events) = EventSink::channel();
        sink.subtest(subtest("good", SubtestStatus::Pass));
        sink.subtest(SubtestResult {
            name: "bad".to_string(),
            status: SubtestStatus::Fail,
            message: Some("expected true".to_string()),
            stack: Some("at bad.js:1".to_string()),
        });
        sink.completed(HarnessStatus::Ok);

        let mut reporter = RecordingReporter::new();
        let failed = drive_document(&mut events, &mut reporter).await;
        assert!(failed);
        assert_eq!(reporter.failures(), vec!["bad"]);
        assert!(reporter.events.contains(&ReporterEvent::Stack(
            "expected true\nat bad.js:1".to_string()
        )));
    }

    #[tokio::test]
    async fn test_drive_document_timeout_label() {
        let (sink, mut events) = EventSink::channel();
        sink.subtest(subtest("slow", SubtestStatus::Timeout));
        sink.completed(HarnessStatus::Ok);

        let mut reporter = RecordingReporter::new();
        assert!(drive_document(&mut events, &mut reporter).await);
        assert_eq!(reporter.failures(), vec!["slow (timeout)"]);
    }

    #[tokio::test]
    async fn test_drive_document_harness_timeout() {
        let (sink, mut events) = EventSink::channel();
        sink.completed(HarnessStatus::Timeout);

        let mut reporter = RecordingReporter::new();
        assert!(drive_document(&mut events, &mut reporter).await);
        assert_eq!(reporter.failures(), vec!["test harness should not timeout"]);
    }

    #[tokio::test]
    async fn test_drive_document_load_failure() {
        let (sink, mut events) = EventSink::channel();
        sink.load_failed("Error: parse\n  at doc");

        let mut reporter = RecordingReporter::new();
        assert!(drive_document(&mut events, &mut reporter).await);
        assert!(reporter.events.contains(&ReporterEvent::Stack(
            "Error: parse\n  at doc".to_string()
        )));
    }

    #[tokio::test]
    async fn test_drive_document_abandoned_counts_as_failure() {
        let (sink, mut events) = EventSink::channel();
        drop(sink);

        let mut reporter = RecordingReporter::new();
        assert!(drive_document(&mut events, &mut reporter).await);
        assert!(reporter.events.is_empty());
    }

    #[tokio::test]
    async fn test_events_after_completion_are_ignored() {
        let (sink, mut events) = EventSink::channel();
        sink.completed(HarnessStatus::Ok);
        sink.subtest(subtest("late", SubtestStatus::Fail));

        let mut reporter = RecordingReporter::new();
        let failed = drive_document(&mut events, &mut reporter).await;
        assert!(!failed);
        assert!(reporter.events.is_empty());
    }
}
