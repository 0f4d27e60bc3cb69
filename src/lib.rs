#![forbid(unsafe_code)]
//! wptrun — web-platform-tests style suite runner
//!
//! Runs a directory of conformance tests following the web-platform-tests
//! naming/metadata convention inside an embedder-provided, DOM-capable
//! engine, and aggregates per-test outcomes into one failure count.
//!
//! The pipeline: `harness` classifies discovered files and expands them
//! into canonical test URLs; `server` answers resource requests (wrapper
//! documents, static files, canned harness stubs); `runner` drives each
//! URL through the [`runner::engine::Engine`] sequentially and reports
//! outcomes through [`runner::reporter::Reporter`].
//!
//! ## Embedding
//!
//! ```no_run
//! # async fn example<E: wptrun::Engine>(engine: E) -> Result<(), wptrun::RunnerError> {
//! use wptrun::{ConsoleReporter, RunnerOptions, run_tests};
//!
//! let mut reporter = ConsoleReporter::new();
//! let failures = run_tests(
//!     &engine,
//!     RunnerOptions::new("wpt/dom/nodes"),
//!     |_context| {},
//!     None,
//!     &mut reporter,
//! )
//! .await?;
//! std::process::exit(failures as i32);
//! # }
//! ```
//!
//! ## Panic Policy
//!
//! Production code uses `Result` with `?`; the `cli` module enforces
//! `#![deny(clippy::unwrap_used)]`. `.expect("INVARIANT: ...")` marks
//! logic-error invariants only. Tests may unwrap freely.

pub mod cli;
pub mod harness;
pub mod runner;
pub mod server;

pub use harness::{SourceFile, parse_variants, read_script_metadata};

pub use server::{Response, ServerOptions, TestServer, WrapperKind, filesystem_path};

pub use runner::engine::{
    Engine, EngineError, EventSink, HarnessEvent, HarnessStatus, SubtestResult, SubtestStatus,
};
pub use runner::reporter::{ConsoleReporter, JsonReporter, RecordingReporter, Reporter};
pub use runner::{RunnerError, RunnerOptions, TestFilter, enumerate_test_paths, run_tests};
