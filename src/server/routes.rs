//! Request dispatch for the in-process transport surface.
//!
//! Routing order: wrapper suffixes first, then static files under the test
//! root, then the canned bodies for well-known harness resources. Anything
//! else gets a plain 404, logged — an unanticipated helper request must
//! never take down the run.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::Response;
use super::path::{PathError, filesystem_path};
use super::wrapper::WrapperKind;

/// Inert test-driver implementation served at `/resources/testdriver.js`.
const TESTDRIVER_BODY: &str = include_str!("../../assets/testdriver.js");

/// Report hook: hands control to the engine-installed reporter when one is
/// present, and stays inert otherwise (e.g. when a wrapper is rendered
/// outside a runner session).
const REPORT_HOOK_BODY: &str =
    "if ('__setupHarnessReporter' in window) window.__setupHarnessReporter();";

const SERVICE_WORKER_HELPER_BODY: &str = "window.service_worker_test = () => {};";
const STREAMS_INITIALIZER_BODY: &str = "window.worker_test = () => {};";

/// Faults constructing the transport surface.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to read harness script {}: {source}", path.display())]
    HarnessScript { path: PathBuf, source: io::Error },
}

/// Configuration for [`TestServer`].
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Base directory holding the test tree.
    pub root: PathBuf,
    /// URL prefix the tree is served under; normalized to start and end
    /// with "/".
    pub url_base: String,
    /// Location of the harness script served at `/resources/testharness.js`.
    /// Read once at construction. When absent, harness requests fall
    /// through to the static tree (and ultimately the logged 404).
    pub harness_script: Option<PathBuf>,
}

impl ServerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_base: "/".to_string(),
            harness_script: None,
        }
    }
}

/// Ensure the URL prefix starts and ends with "/".
pub fn normalize_url_base(url_base: &str) -> String {
    let mut base = url_base.to_string();
    if !base.starts_with('/') {
        base.insert(0, '/');
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

/// The in-process transport surface.
///
/// Stateless per request; holds only the configuration and the harness
/// body read at construction, so nothing outlives a settled run.
#[derive(Debug)]
pub struct TestServer {
    root: PathBuf,
    url_base: String,
    harness_body: Option<Vec<u8>>,
}

impl TestServer {
    pub fn new(options: ServerOptions) -> Result<Self, ServerError> {
        let harness_body = match &options.harness_script {
            Some(path) => Some(fs::read(path).map_err(|source| ServerError::HarnessScript {
                path: path.clone(),
                source,
            })?),
            None => None,
        };
        Ok(Self {
            root: options.root,
            url_base: normalize_url_base(&options.url_base),
            harness_body,
        })
    }

    /// The normalized URL prefix the test tree is served under.
    pub fn url_base(&self) -> &str {
        &self.url_base
    }

    /// Answer one request for `target` (a path with optional query string).
    pub fn handle(&self, target: &str) -> Response {
        let (pathname, query) = split_target(target);

        if let Some(kind) = WrapperKind::for_request_path(pathname) {
            return kind.respond(&self.root, &self.url_base, pathname, query);
        }

        match self.try_static(pathname) {
            StaticOutcome::Served(response) => return response,
            StaticOutcome::ClientError(err) => {
                return Response::new(400, err.to_string());
            }
            StaticOutcome::Miss => {}
        }

        if let Some(response) = self.canned_body(pathname) {
            return response;
        }

        tracing::warn!(path = pathname, "no handler for request path");
        Response::not_found(format!("no handler for {pathname}"))
    }

    /// Serve a file from the test tree, when one exists at the request path.
    fn try_static(&self, pathname: &str) -> StaticOutcome {
        let file = match filesystem_path(&self.root, pathname, &self.url_base) {
            Ok(file) => file,
            Err(err) => return StaticOutcome::ClientError(err),
        };
        if !file.is_file() {
            return StaticOutcome::Miss;
        }
        match fs::read(&file) {
            Ok(body) => StaticOutcome::Served(Response::ok(content_type_for(pathname), body)),
            Err(err) => {
                tracing::warn!(path = %file.display(), error = %err, "failed to read static file");
                StaticOutcome::Served(Response::new(500, err.to_string()))
            }
        }
    }

    /// Fixed bodies for the well-known harness resources.
    fn canned_body(&self, pathname: &str) -> Option<Response> {
        let response = match pathname {
            "/resources/testharness.js" => {
                let body = self.harness_body.clone()?;
                Response::ok("text/javascript", body)
            }
            "/resources/testharnessreport.js" => Response::ok("text/javascript", REPORT_HOOK_BODY),
            "/resources/testharness.css" => Response::ok("text/css", ""),
            "/resources/testdriver.js" => Response::ok("text/javascript", TESTDRIVER_BODY),
            "/resources/testdriver-vendor.js" => Response::ok("text/javascript", ""),
            "/service-workers/service-worker/resources/test-helpers.sub.js" => {
                Response::ok("text/javascript", SERVICE_WORKER_HELPER_BODY)
            }
            "/streams/resources/test-initializer.js" => {
                Response::ok("text/javascript", STREAMS_INITIALIZER_BODY)
            }
            "/favicon.ico" => Response::not_found(""),
            _ => return None,
        };
        Some(response)
    }
}

enum StaticOutcome {
    Served(Response),
    ClientError(PathError),
    Miss,
}

/// Split a request target into pathname and query (leading "?" included).
fn split_target(target: &str) -> (&str, &str) {
    match target.find('?') {
        Some(pos) => (&target[..pos], &target[pos..]),
        None => (target, ""),
    }
}

/// Minimal extension-based content typing for the static tree.
fn content_type_for(pathname: &str) -> &'static str {
    let ext = pathname.rsplit('.').next().unwrap_or("");
    match ext {
        "html" | "htm" => "text/html",
        "xhtml" => "application/xhtml+xml",
        "js" | "mjs" => "text/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// TESTS
// ============================================================================
