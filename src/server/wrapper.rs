//! Wrapper documents: serving a bare script test as a browsable page.
//!
//! A request for a synthetic markup suffix (`foo.window.html`,
//! `foo.any.html`) is answered by locating the backing script, re-reading
//! its `// META:` block, and rendering a fixed HTML template that loads the
//! harness, any declared extra scripts, and the target script itself.
//!
//! The handler set is a closed table of tagged kinds rather than an open
//! hierarchy: each kind supplies headers, path-rewrite rules, an exposure
//! check, and a template.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::harness::metadata::{self, MetaEntry, read_script_metadata};
use crate::harness::variants::{parse_variants, replace_end};

use super::Response;
use super::path::{PathError, filesystem_path};

/// Faults while answering a wrapper request. Exposure-phase faults map to
/// 404, render-phase faults to 500; both carry the fault message as body.
#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("This test cannot be loaded in {0} mode")]
    UnsupportedGlobal(&'static str),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// A suffix-rewrite rule mapping a request path to the backing resources.
///
/// `filesystem` names the file on disk that holds the metadata and script;
/// `resource` names the URL the rendered wrapper loads. They differ only
/// under layered wrapping, where an outer wrapper loads an inner synthetic
/// resource rather than the disk file itself.
struct PathRule {
    request: &'static str,
    filesystem: &'static str,
    resource: &'static str,
}

impl PathRule {
    const fn direct(request: &'static str, backing: &'static str) -> Self {
        Self {
            request,
            filesystem: backing,
            resource: backing,
        }
    }
}

const WINDOW_RULES: &[PathRule] = &[PathRule::direct(".window.html", ".window.js")];
const ANY_HTML_RULES: &[PathRule] = &[PathRule::direct(".any.html", ".any.js")];

const HTML_HEADERS: &[(&str, &str)] = &[("Content-Type", "text/html")];

/// Which side of a path rule to rewrite toward.
#[derive(Clone, Copy)]
enum PathTarget {
    Filesystem,
    Resource,
}

/// The closed set of wrapper document kinds, keyed by request suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    /// `*.window.html` — wraps a window-only script.
    Window,
    /// `*.any.html` — wraps a multi-global script in its window flavor.
    AnyHtml,
}

/// Dispatch table consulted by the router, in match order.
pub const WRAPPER_ROUTES: &[(&str, WrapperKind)] = &[
    (".window.html", WrapperKind::Window),
    (".any.html", WrapperKind::AnyHtml),
];

impl WrapperKind {
    /// Select the wrapper kind for a request path, if any suffix matches.
    pub fn for_request_path(pathname: &str) -> Option<Self> {
        WRAPPER_ROUTES
            .iter()
            .find(|(suffix, _)| pathname.ends_with(suffix))
            .map(|&(_, kind)| kind)
    }

    /// Answer a wrapper request for `pathname` (+ optional `query`, leading
    /// "?" included) against the tree rooted at `base_path`.
    pub fn respond(
        self,
        base_path: &Path,
        url_base: &str,
        pathname: &str,
        query: &str,
    ) -> Response {
        if let Err(fault) = self.check_exposure(base_path, url_base, pathname) {
            return Response::with_headers(404, HTML_HEADERS, fault.to_string());
        }
        match self.render(base_path, url_base, pathname, query) {
            Ok(document) => Response::with_headers(200, HTML_HEADERS, document),
            Err(fault) => Response::with_headers(500, HTML_HEADERS, fault.to_string()),
        }
    }

    fn path_rules(self) -> &'static [PathRule] {
        match self {
            WrapperKind::Window => WINDOW_RULES,
            WrapperKind::AnyHtml => ANY_HTML_RULES,
        }
    }

    /// The global flavor this wrapper exposes, when restricted.
    fn global_type(self) -> Option<&'static str> {
        match self {
            WrapperKind::Window => None,
            WrapperKind::AnyHtml => Some("window"),
        }
    }

    /// Apply the suffix-rewrite rules toward the filesystem or resource side.
    fn rewrite_path(self, pathname: &str, target: PathTarget) -> String {
        let mut path = pathname.to_string();
        for rule in self.path_rules() {
            if path.ends_with(rule.request) {
                let dest = match target {
                    PathTarget::Filesystem => rule.filesystem,
                    PathTarget::Resource => rule.resource,
                };
                path = replace_end(&path, rule.request, dest);
            }
        }
        path
    }

    /// Re-extract the backing script's metadata for this request.
    fn backing_metadata(
        self,
        base_path: &Path,
        url_base: &str,
        pathname: &str,
    ) -> Result<Vec<MetaEntry>, WrapperError> {
        let backing_url = self.rewrite_path(pathname, PathTarget::Filesystem);
        let file = filesystem_path(base_path, &backing_url, url_base)?;
        let source = fs::read_to_string(&file)
            .map_err(|source| WrapperError::Read { path: file, source })?;
        Ok(read_script_metadata(&source))
    }

    /// Reject the request when the backing script's declared globals exclude
    /// this wrapper's flavor.
    fn check_exposure(
        self,
        base_path: &Path,
        url_base: &str,
        pathname: &str,
    ) -> Result<(), WrapperError> {
        let Some(global_type) = self.global_type() else {
            return Ok(());
        };
        let entries = self.backing_metadata(base_path, url_base, pathname)?;
        // Last declaration wins here.
        let globals = metadata::last_global(&entries).unwrap_or("");
        if !parse_variants(globals).contains(global_type) {
            return Err(WrapperError::UnsupportedGlobal(global_type));
        }
        Ok(())
    }

    fn render(
        self,
        base_path: &Path,
        url_base: &str,
        pathname: &str,
        query: &str,
    ) -> Result<String, WrapperError> {
        let entries = self.backing_metadata(base_path, url_base, pathname)?;
        let resource_path = self.rewrite_path(pathname, PathTarget::Resource);

        let meta = join_replacements(&entries, meta_replacement);
        let script = join_replacements(&entries, script_replacement);

        Ok(self.template(&meta, &script, &resource_path, query))
    }

    /// The fixed wrapper document, with meta strings, script strings,
    /// resource path, and query substituted.
    fn template(self, meta: &str, script: &str, path: &str, query: &str) -> String {
        match self {
            WrapperKind::Window => format!(
                "<!doctype html>\n\
                 <meta charset=utf-8>\n\
                 {meta}\n\
                 <script src=\"/resources/testharness.js\"></script>\n\
                 <script src=\"/resources/testharnessreport.js\"></script>\n\
                 {script}\n\
                 <div id=log></div>\n\
                 <script src=\"{path}{query}\"></script>\n"
            ),
            WrapperKind::AnyHtml => format!(
                "<!doctype html>\n\
                 <meta charset=utf-8>\n\
                 {meta}\n\
                 <script>\n\
                 self.GLOBAL = {{\n\
                 \x20\x20isWindow: function() {{ return true; }},\n\
                 \x20\x20isWorker: function() {{ return false; }},\n\
                 }};\n\
                 </script>\n\
                 <script src=\"/resources/testharness.js\"></script>\n\
                 <script src=\"/resources/testharnessreport.js\"></script>\n\
                 {script}\n\
                 <div id=log></div>\n\
                 <script src=\"{path}{query}\"></script>\n"
            ),
        }
    }
}

/// Map every metadata entry through `replace` and join the injected strings.
fn join_replacements(entries: &[MetaEntry], replace: fn(&str, &str) -> Option<String>) -> String {
    entries
        .iter()
        .filter_map(|(key, value)| replace(key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Head-section injection for one metadata entry, when the key maps to one.
fn meta_replacement(key: &str, value: &str) -> Option<String> {
    match key {
        "timeout" if value == "long" => {
            Some(format!("<meta name=\"timeout\" content=\"{value}\">"))
        }
        "title" => {
            let text = escape_html_text(value);
            Some(format!("<title>{text}</title>"))
        }
        _ => None,
    }
}

/// Extra-script injection for one metadata entry, when the key maps to one.
fn script_replacement(key: &str, value: &str) -> Option<String> {
    match key {
        "script" => {
            let src = escape_attribute(value);
            Some(format!("<script src=\"{src}\"></script>"))
        }
        _ => None,
    }
}

/// Escaping for HTML text content. Narrow and context-specific, not a
/// general sanitizer.
fn escape_html_text(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;")
}

/// Escaping for a double-quoted attribute value.
fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

// ============================================================================
// TESTS
// ============================================================================
