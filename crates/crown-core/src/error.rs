//! Unified error types for the Crown framework.
//!
//! Every failure raised inside the request pipeline is a [`CrownError`], so the
//! exception handler can log, trap or rethrow them uniformly. Runtime-level
//! errors (configuration, bootstrap) are defined in `crown-runtime`.

use std::sync::Arc;

use http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

use crate::request::Request;

/// Coarse classification of a [`CrownError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No registered handler matched the request.
    Routing,
    /// The configured layout name did not resolve to a layout.
    LayoutResolution,
    /// A handler reported a failure.
    Handler,
    /// A handler argument could not be extracted from the request.
    Extraction,
    /// Anything else.
    Other,
}

/// Errors raised while turning a request into a response.
#[derive(Debug, Clone, Error)]
pub enum CrownError {
    /// No registered handler matched the request.
    #[error("A handler for request this could not be found.")]
    NoHandlerForRequest {
        /// The exact request that could not be routed.
        request: Arc<Request>,
    },

    /// The layout filter could not resolve the configured layout.
    #[error("layout '{name}' could not be found")]
    LayoutNotFound {
        /// The resolved layout name that had no provider.
        name: String,
    },

    /// A handler returned an error.
    #[error("handler failed: {0}")]
    Handler(String),

    /// A handler argument could not be extracted.
    #[error("could not extract {what}: {reason}")]
    Extract {
        /// Name of the type that failed to extract.
        what: &'static str,
        /// Why extraction failed.
        reason: String,
    },

    /// Free-form failure with optional structured context.
    #[error("{message}")]
    Custom {
        /// Human-readable message.
        message: String,
        /// Optional structured context.
        context: Option<Value>,
    },
}

impl CrownError {
    /// Creates a routing failure for `request`.
    pub fn no_handler(request: Arc<Request>) -> Self {
        Self::NoHandlerForRequest { request }
    }

    /// Creates a layout resolution failure.
    pub fn layout_not_found(name: impl Into<String>) -> Self {
        Self::LayoutNotFound { name: name.into() }
    }

    /// Creates a handler failure.
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    /// Creates an extraction failure for the type `what`.
    pub fn extract(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Extract {
            what,
            reason: reason.into(),
        }
    }

    /// Creates a custom error without context.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom {
            message: msg.into(),
            context: None,
        }
    }

    /// Creates a custom error carrying structured context.
    pub fn with_context(msg: impl Into<String>, context: Value) -> Self {
        Self::Custom {
            message: msg.into(),
            context: Some(context),
        }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoHandlerForRequest { .. } => ErrorKind::Routing,
            Self::LayoutNotFound { .. } => ErrorKind::LayoutResolution,
            Self::Handler(_) => ErrorKind::Handler,
            Self::Extract { .. } => ErrorKind::Extraction,
            Self::Custom { .. } => ErrorKind::Other,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns structured context describing the failure, if any.
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::NoHandlerForRequest { request } => Some(json!({
                "path": request.path(),
                "method": request.method().as_str(),
                "is_web_request": request.is_web_request(),
            })),
            Self::LayoutNotFound { name } => Some(json!({ "layout": name })),
            Self::Extract { what, .. } => Some(json!({ "type": what })),
            Self::Custom { context, .. } => context.clone(),
            Self::Handler(_) => None,
        }
    }

    /// Returns the request that failed routing, if this is a routing failure.
    pub fn request(&self) -> Option<&Arc<Request>> {
        match self {
            Self::NoHandlerForRequest { request } => Some(request),
            _ => None,
        }
    }

    /// Returns the status code an error response should carry.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Routing => StatusCode::NOT_FOUND,
            ErrorKind::Extraction => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for pipeline operations.
pub type CrownResult<T> = Result<T, CrownError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_handler_message_is_fixed() {
        let request = Arc::new(Request::get("/missing/"));
        let err = CrownError::no_handler(Arc::clone(&request));

        assert_eq!(
            err.message(),
            "A handler for request this could not be found."
        );
        assert_eq!(err.kind(), ErrorKind::Routing);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(Arc::ptr_eq(err.request().unwrap(), &request));
        assert_eq!(err.context().unwrap()["path"], "/missing/");
    }

    #[test]
    fn test_layout_not_found() {
        let err = CrownError::layout_not_found("NonExistent");
        assert_eq!(err.kind(), ErrorKind::LayoutResolution);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.request().is_none());
        assert_eq!(err.context().unwrap()["layout"], "NonExistent");
    }

    #[test]
    fn test_extract_is_bad_request() {
        let err = CrownError::extract("RequestedWith", "header missing");
        assert_eq!(
            err.to_string(),
            "could not extract RequestedWith: header missing"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.context().unwrap()["type"], "RequestedWith");
    }

    #[test]
    fn test_custom_context() {
        let err = CrownError::with_context("boom", json!({ "id": 7 }));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.context().unwrap()["id"], 7);
        assert!(CrownError::custom("plain").context().is_none());
    }
}
