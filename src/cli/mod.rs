//! CLI for the engine-free halves of the tool.
//!
//! ## Commands
//!
//! - `list <path>` - print the expanded, sorted TestURL list for a test tree
//! - `render <path> <url>` - print the transport response body for one URL
//! - `meta <file>` - print the parsed `// META:` block of a script file
//!
//! Executing tests requires an embedder-provided engine; the library's
//! `run_tests` is the embedding API, and embedders exit with the failure
//! count it returns.
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling
//! `process::exit`; only the top-level `run()` handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use crate::harness::read_script_metadata;
use crate::runner::enumerate_test_paths;
use crate::server::routes::normalize_url_base;
use crate::server::{ServerOptions, TestServer};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations: a user-facing message plus the exit code
/// the entry point returns to the shell.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Web-platform-tests style suite tooling
#[derive(Parser, Debug)]
#[command(name = "wptrun")]
#[command(version = VERSION)]
#[command(about = "Discovers and serves web-platform-tests style suites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the expanded, sorted test URL list for a test tree
    List {
        /// Base directory holding the tests
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// The URL prefix the tests are served under, e.g. dom/nodes/
        #[arg(short = 'u', long = "root-url", value_name = "URL")]
        root_url: Option<String>,
    },

    /// Print the transport response for one URL (wrapper inspection)
    Render {
        /// Base directory holding the tests
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Request URL, e.g. /dom/nodes/foo.any.html
        #[arg(value_name = "URL")]
        url: String,
        /// The URL prefix the tests are served under
        #[arg(short = 'u', long = "root-url", value_name = "URL")]
        root_url: Option<String>,
        /// Harness script served at /resources/testharness.js
        #[arg(long = "harness", value_name = "FILE")]
        harness: Option<PathBuf>,
    },

    /// Print the parsed metadata block of a script file
    Meta {
        /// Script file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::List { path, root_url } => list_tests(&path, root_url.as_deref()),
        Command::Render {
            path,
            url,
            root_url,
            harness,
        } => render_url(&path, &url, root_url.as_deref(), harness),
        Command::Meta { file } => print_metadata(&file),
    }
}

fn list_tests(path: &Path, root_url: Option<&str>) -> CliResult<ExitCode> {
    let url_base = normalize_url_base(root_url.unwrap_or("/"));
    let test_paths =
        enumerate_test_paths(path).map_err(|e| CliError::failure(format!("Error: {e}")))?;
    for test_path in &test_paths {
        println!("{url_base}{test_path}");
    }
    Ok(ExitCode::SUCCESS)
}

fn render_url(
    path: &Path,
    url: &str,
    root_url: Option<&str>,
    harness: Option<PathBuf>,
) -> CliResult<ExitCode> {
    let server = TestServer::new(ServerOptions {
        root: path.to_path_buf(),
        url_base: root_url.unwrap_or("/").to_string(),
        harness_script: harness,
    })
    .map_err(|e| CliError::failure(format!("Error: {e}")))?;

    let response = server.handle(url);
    print!("{}", response.text());
    if response.status == 200 {
        Ok(ExitCode::SUCCESS)
    } else {
        Err(CliError::failure(format!("Error: HTTP {}", response.status)))
    }
}

fn print_metadata(file: &Path) -> CliResult<ExitCode> {
    let source = fs::read_to_string(file)
        .map_err(|e| CliError::failure(format!("Error reading {}: {e}", file.display())))?;
    for (key, value) in read_script_metadata(&source) {
        println!("{key}={value}");
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Tests
// ============================================================================
