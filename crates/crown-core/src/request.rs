//! Inbound request model.
//!
//! A [`Request`] describes one inbound call: the URL path, the HTTP method,
//! the headers and whether it arrived over the web (as opposed to a CLI or
//! scheduled invocation). Requests are built once through [`RequestBuilder`]
//! and are read-only afterwards; the pipeline shares them as `Arc<Request>`.
//!
//! ```rust,ignore
//! use crown_core::Request;
//!
//! let request = Request::builder()
//!     .path("/simple/")
//!     .header("X-Requested-With", "XMLHttpRequest")
//!     .build();
//!
//! assert!(request.is_ajax());
//! ```

use http::Method;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

/// Header consulted by [`Request::is_ajax`].
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// The exact header value that marks an AJAX call.
pub const AJAX_MARKER: &str = "XMLHttpRequest";

/// An immutable description of an inbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    path: String,
    method: Method,
    headers: HeaderMap,
    is_web_request: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            method: Method::GET,
            headers: HeaderMap::new(),
            is_web_request: true,
        }
    }
}

impl Request {
    /// Starts building a new request.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Shorthand for a `GET` web request to `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::builder().path(path).build()
    }

    /// Returns the URL path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns all request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    ///
    /// Header names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `true` if the request arrived over HTTP.
    pub fn is_web_request(&self) -> bool {
        self.is_web_request
    }

    /// Returns `true` if `X-Requested-With` is exactly `XMLHttpRequest`.
    pub fn is_ajax(&self) -> bool {
        self.header(REQUESTED_WITH_HEADER) == Some(AJAX_MARKER)
    }
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Sets the URL path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.request.path = path.into();
        self
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    /// Appends a header.
    ///
    /// Names or values that are not valid HTTP tokens are dropped with a
    /// warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.request.headers.append(name, value);
            }
            _ => warn!(header = name, "Ignoring invalid request header"),
        }
        self
    }

    /// Replaces all headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.request.headers = headers;
        self
    }

    /// Marks whether the request arrived over HTTP (default: `true`).
    pub fn web_request(mut self, is_web_request: bool) -> Self {
        self.request.is_web_request = is_web_request;
        self
    }

    /// Finishes the request.
    pub fn build(self) -> Request {
        self.request
    }
}
