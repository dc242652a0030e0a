//! # Crown Core
//!
//! The core model of the Crown web framework.
//!
//! This crate provides the leaf types every other layer builds on:
//!
//! - **Request**: an immutable description of an inbound call ([`Request`])
//! - **Response**: markup or JSON payloads with status and headers ([`Response`], [`Content`])
//! - **Errors**: the uniform failure type raised by the pipeline ([`CrownError`])
//! - **Handlers**: Axum-style async functions with extracted parameters ([`Handler`], [`FromRequest`])
//! - **Filters**: post-processing of generated responses ([`ResponseFilter`])
//!
//! ```text
//! Request ──▶ Handler ──▶ Response ──▶ ResponseFilter ──▶ ResponseFilter ──▶ transport
//! ```

pub mod error;
pub mod extract;
pub mod filter;
pub mod handler;
pub mod request;
pub mod response;

pub use error::{CrownError, CrownResult, ErrorKind};
pub use extract::{Ajax, FromRequest, RequestedWith, UrlPath};
pub use filter::{BoxedResponseFilter, FilterFn, ResponseFilter, filter_fn};
pub use handler::{BoxedHandler, Handler, IntoResponse, into_handler};
pub use request::{AJAX_MARKER, REQUESTED_WITH_HEADER, Request, RequestBuilder};
pub use response::{Content, ContentKind, HTML_CONTENT_TYPE, JSON_CONTENT_TYPE, Response};

// Re-export http types that appear in the public API
pub use http::{HeaderMap, Method, StatusCode};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Content, CrownError, CrownResult, FromRequest, Handler, IntoResponse, Request, Response,
        ResponseFilter, UrlPath, filter_fn, into_handler,
    };
}
