//! Outbound response model.
//!
//! A [`Response`] is produced by a handler, passed through the response
//! filter chain and consumed once by the transport layer. Its payload is a
//! [`Content`]: raw markup for HTML responses or a structured
//! [`serde_json::Value`] for JSON responses. Filters use the content kind to
//! decide whether they apply (the layout filter only wraps markup).

use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::error::{CrownError, CrownResult};

/// `Content-Type` used for markup responses.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// `Content-Type` used for JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Which kind of payload a response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Text or HTML markup.
    Markup,
    /// Structured data rendered as JSON.
    Json,
}

/// The payload of a [`Response`].
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Text or HTML markup.
    Markup(String),
    /// Structured data.
    Json(Value),
}

impl Content {
    /// Returns the kind of this payload.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Markup(_) => ContentKind::Markup,
            Self::Json(_) => ContentKind::Json,
        }
    }

    /// Returns the markup, if this is a markup payload.
    pub fn as_markup(&self) -> Option<&str> {
        match self {
            Self::Markup(s) => Some(s),
            Self::Json(_) => None,
        }
    }

    /// Returns the structured value, if this is a JSON payload.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Markup(_) => None,
        }
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Markup(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Markup(value.to_string())
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A generated response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    content: Content,
}

impl Default for Response {
    fn default() -> Self {
        Self::html(String::new())
    }
}

impl Response {
    /// Creates a `200 OK` markup response.
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content: Content::Markup(content.into()),
        }
    }

    /// Creates a `200 OK` JSON response.
    pub fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content: Content::Json(value),
        }
    }

    /// Creates a JSON response by serialising `value`.
    pub fn json_from<T: Serialize>(value: &T) -> CrownResult<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| CrownError::custom(e.to_string()))?;
        Ok(Self::json(value))
    }

    /// Sets the status code (builder style).
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a header (builder style). Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the headers set by handlers and filters.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the payload.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Replaces the payload.
    ///
    /// No validation is performed: switching a markup response to JSON
    /// content (or back) is the caller's responsibility.
    pub fn set_content(&mut self, content: impl Into<Content>) {
        self.content = content.into();
    }

    /// Consumes the response, returning its payload.
    pub fn into_content(self) -> Content {
        self.content
    }

    /// Returns the kind of payload this response carries.
    pub fn content_kind(&self) -> ContentKind {
        self.content.kind()
    }

    /// Returns `true` for markup responses.
    pub fn is_markup(&self) -> bool {
        self.content_kind() == ContentKind::Markup
    }

    /// Returns `true` for JSON responses.
    pub fn is_json(&self) -> bool {
        self.content_kind() == ContentKind::Json
    }

    /// Returns the effective `Content-Type`.
    ///
    /// An explicit `Content-Type` header wins over the default for the
    /// content kind.
    pub fn content_type(&self) -> &str {
        if let Some(value) = self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            return value;
        }
        match self.content_kind() {
            ContentKind::Markup => HTML_CONTENT_TYPE,
            ContentKind::Json => JSON_CONTENT_TYPE,
        }
    }

    /// Renders the payload as the body string sent to the client.
    pub fn body_string(&self) -> String {
        match &self.content {
            Content::Markup(s) => s.clone(),
            Content::Json(v) => v.to_string(),
        }
    }
}
