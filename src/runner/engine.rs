//! The execution-environment boundary.
//!
//! The orchestrator never touches a DOM: it hands a URL to an [`Engine`]
//! and waits for harness events to arrive on an event stream. Any headless,
//! DOM-capable environment can sit behind the trait; the runner's own tests
//! use a scripted stand-in.

use thiserror::Error;

use tokio::sync::mpsc;

use crate::server::TestServer;

/// Terminal status of a single subtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtestStatus {
    Pass,
    Fail,
    Timeout,
    Incomplete,
    PreconditionFailed,
}

impl SubtestStatus {
    /// Map the harness's numeric status codes.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => SubtestStatus::Pass,
            2 => SubtestStatus::Timeout,
            3 => SubtestStatus::Incomplete,
            4 => SubtestStatus::PreconditionFailed,
            _ => SubtestStatus::Fail,
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, SubtestStatus::Pass)
    }

    /// Short label appended to failure messages for non-fail statuses.
    pub(crate) fn label(self) -> Option<&'static str> {
        match self {
            SubtestStatus::Pass | SubtestStatus::Fail => None,
            SubtestStatus::Timeout => Some("timeout"),
            SubtestStatus::Incomplete => Some("incomplete"),
            SubtestStatus::PreconditionFailed => Some("precondition failed"),
        }
    }
}

/// One subtest's result as reported by the in-page harness.
#[derive(Debug, Clone)]
pub struct SubtestResult {
    pub name: String,
    pub status: SubtestStatus,
    pub message: Option<String>,
    pub stack: Option<String>,
}

/// Harness-level completion status for the whole document.
#[derive(Debug, Clone)]
pub enum HarnessStatus {
    Ok,
    Error { message: String, stack: Option<String> },
    Timeout,
    PreconditionFailed,
}

/// Everything an engine can tell the orchestrator about a loaded document.
#[derive(Debug)]
pub enum HarnessEvent {
    /// A per-subtest result callback fired.
    Subtest(SubtestResult),
    /// The harness completion callback fired; terminal.
    Completed(HarnessStatus),
    /// The document failed to load or parse; terminal.
    LoadFailed { stack: String },
}

/// A document failed before the harness could run.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
    pub stack: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: Some(stack.into()),
        }
    }

    /// The text surfaced through `report_stack`: the stack when the engine
    /// captured one, the message otherwise.
    pub fn report_text(&self) -> &str {
        self.stack.as_deref().unwrap_or(&self.message)
    }
}

/// Sending half of the harness event stream, cloned into engine callbacks.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<HarnessEvent>,
}

impl EventSink {
    /// Create a connected sink/stream pair for one document.
    pub fn channel() -> (EventSink, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, EventStream { rx })
    }

    /// Forward one subtest result.
    pub fn subtest(&self, result: SubtestResult) {
        let _ = self.tx.send(HarnessEvent::Subtest(result));
    }

    /// Signal harness completion. The orchestrator resolves on the first
    /// completion; later signals are ignored.
    pub fn completed(&self, status: HarnessStatus) {
        let _ = self.tx.send(HarnessEvent::Completed(status));
    }

    /// Signal that the document never loaded.
    pub fn load_failed(&self, stack: impl Into<String>) {
        let _ = self.tx.send(HarnessEvent::LoadFailed {
            stack: stack.into(),
        });
    }
}

/// Receiving half of the harness event stream, awaited by the orchestrator.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<HarnessEvent>,
}

impl EventStream {
    /// Next event, or `None` once every sink clone is gone.
    pub async fn next(&mut self) -> Option<HarnessEvent> {
        self.rx.recv().await
    }
}

/// A headless, DOM-capable execution environment.
///
/// Contract for implementations:
/// - `load` opens `url` in a fresh, isolated context, fetching resources
///   through `server`.
/// - Constructs the environment does not support (off-main-thread workers)
///   get inert stand-ins installed before scripts run, so documents
///   referencing them no-op instead of failing to load.
/// - `setup` is invoked with the live context before any harness wiring.
/// - The engine defines the `__setupHarnessReporter` global the served
///   report hook invokes; its wiring forwards every per-subtest result and
///   the single completion callback into `events`, and should also stub
///   `fetch_tests_from_worker` to a no-op.
/// - Load or parse failures surface either as an `Err` from `load` or as a
///   [`HarnessEvent::LoadFailed`] on the stream.
/// - The returned context stays live until the orchestrator drops it after
///   the document's outcome resolves.
pub trait Engine {
    type Context: Send;

    fn load(
        &self,
        server: &TestServer,
        url: &str,
        setup: &mut (dyn FnMut(&mut Self::Context) + Send),
        events: EventSink,
    ) -> impl Future<Output = Result<Self::Context, EngineError>> + Send;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(SubtestStatus::from_code(0), SubtestStatus::Pass);
        assert_eq!(SubtestStatus::from_code(1), SubtestStatus::Fail);
        assert_eq!(SubtestStatus::from_code(2), SubtestStatus::Timeout);
        assert_eq!(SubtestStatus::from_code(3), SubtestStatus::Incomplete);
        assert_eq!(SubtestStatus::from_code(4), SubtestStatus::PreconditionFailed);
        assert_eq!(SubtestStatus::from_code(99), SubtestStatus::Fail);
    }

    #[tokio::test]
    async fn test_event_stream_ends_when_sinks_drop() {
        let (sink, mut events) = EventSink::channel();
        sink.completed(HarnessStatus::Ok);
        drop(sink);

        assert!(matches!(
            events.next().await,
            Some(HarnessEvent::Completed(HarnessStatus::Ok))
        ));
        assert!(events.next().await.is_none());
    }

    #[test]
    fn test_engine_error_report_text() {
        let plain = EngineError::new("connection refused");
        assert_eq!(plain.report_text(), "connection refused");

        let with_stack = EngineError::with_stack("boom", "Error: boom\n  at load");
        assert_eq!(with_stack.report_text(), "Error: boom\n  at load");
    }
}
