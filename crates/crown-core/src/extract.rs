//! Handler argument extraction.
//!
//! Types implementing [`FromRequest`] can be used directly as handler
//! parameters. Extraction failures abort the handler with
//! [`CrownError::Extract`](crate::error::CrownError::Extract).

use std::sync::Arc;

use http::Method;
use http::header::HeaderMap;

use crate::error::{CrownError, CrownResult};
use crate::request::{REQUESTED_WITH_HEADER, Request};

/// A trait for types that can be extracted from an inbound [`Request`].
pub trait FromRequest: Sized {
    /// Attempts to extract this type from the given request.
    fn from_request(request: &Arc<Request>) -> CrownResult<Self>;
}

/// The shared request itself.
impl FromRequest for Arc<Request> {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(Arc::clone(request))
    }
}

/// An owned copy of the request.
impl FromRequest for Request {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(request.as_ref().clone())
    }
}

impl FromRequest for HeaderMap {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(request.headers().clone())
    }
}

impl FromRequest for Method {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(request.method().clone())
    }
}

/// Optional parameters never fail; a failed inner extraction yields `None`.
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(T::from_request(request).ok())
    }
}

/// The URL path of the request.
///
/// ```rust,ignore
/// async fn show(UrlPath(path): UrlPath) -> String {
///     format!("<p>You asked for {path}</p>")
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPath(pub String);

impl FromRequest for UrlPath {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(Self(request.path().to_string()))
    }
}

/// Whether the request was made via `XMLHttpRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ajax(pub bool);

impl FromRequest for Ajax {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        Ok(Self(request.is_ajax()))
    }
}

/// The raw `X-Requested-With` header. Fails if the header is absent.
///
/// Wrap in `Option` to accept requests without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedWith(pub String);

impl FromRequest for RequestedWith {
    fn from_request(request: &Arc<Request>) -> CrownResult<Self> {
        request
            .header(REQUESTED_WITH_HEADER)
            .map(|value| Self(value.to_string()))
            .ok_or_else(|| CrownError::extract("RequestedWith", "header missing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ajax_request() -> Arc<Request> {
        let request = Request::builder()
            .path("/items")
            .header("X-Requested-With", "XMLHttpRequest")
            .build();
        Arc::new(request)
    }

    #[test]
    fn test_basic_extractors() {
        let request = ajax_request();
        assert_eq!(UrlPath::from_request(&request).unwrap().0, "/items");
        assert_eq!(Method::from_request(&request).unwrap(), Method::GET);
        assert!(Ajax::from_request(&request).unwrap().0);
        let shared = Arc::<Request>::from_request(&request).unwrap();
        assert!(Arc::ptr_eq(&shared, &request));
    }

    #[test]
    fn test_required_header() {
        let request = ajax_request();
        assert_eq!(
            RequestedWith::from_request(&request).unwrap(),
            RequestedWith("XMLHttpRequest".to_string())
        );

        let plain = Arc::new(Request::get("/"));
        let err = RequestedWith::from_request(&plain).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert_eq!(Option::<RequestedWith>::from_request(&plain).unwrap(), None);
    }
}
