//! Transport surface consulted by execution engines.
//!
//! ## Modules
//!
//! - `path` - traversal-safe URL-to-filesystem resolution
//! - `wrapper` - synthetic wrapper documents for script-only test formats
//! - `routes` - request dispatch: wrappers, static files, canned stubs

pub mod path;
pub mod routes;
pub mod wrapper;

pub use path::{PathError, filesystem_path};
pub use routes::{ServerError, ServerOptions, TestServer};
pub use wrapper::WrapperKind;

/// An in-process response: status, headers, body.
///
/// This is the whole transport contract — engines consume these directly
/// instead of going through a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_headers(status: u16, headers: &[(&str, &str)], body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.into(),
        }
    }

    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::with_headers(200, &[("Content-Type", content_type)], body)
    }

    pub fn not_found(body: impl Into<Vec<u8>>) -> Self {
        Self::new(404, body)
    }

    /// The body as UTF-8 text, for callers that know the response is textual.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
