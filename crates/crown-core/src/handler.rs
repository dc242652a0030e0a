//! Handler system for the Crown framework.
//!
//! Handlers produce a [`Response`] for a matched [`Request`]. The [`Handler`]
//! trait is implemented through blanket implementations for async functions
//! of different arities, similar to Axum's handler system:
//!
//! ```rust,ignore
//! use crown_core::{Request, Response, UrlPath};
//!
//! // No parameters, markup response
//! async fn home() -> &'static str {
//!     "<h1>Home</h1>"
//! }
//!
//! // Extracted parameters, fallible
//! async fn page(UrlPath(path): UrlPath) -> Result<Response, CrownError> {
//!     Ok(Response::html(format!("<p>{path}</p>")))
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::{CrownError, CrownResult};
use crate::extract::FromRequest;
use crate::request::Request;
use crate::response::{Content, Response};

// ============================================================================
// IntoResponse - Convert handler return values
// ============================================================================

/// A trait for types that can be returned from handlers.
pub trait IntoResponse {
    /// Converts this value into a response.
    fn into_response(self) -> CrownResult<Response>;
}

impl IntoResponse for Response {
    fn into_response(self) -> CrownResult<Response> {
        Ok(self)
    }
}

/// Markup response.
impl IntoResponse for String {
    fn into_response(self) -> CrownResult<Response> {
        Ok(Response::html(self))
    }
}

/// Markup response.
impl IntoResponse for &'static str {
    fn into_response(self) -> CrownResult<Response> {
        Ok(Response::html(self))
    }
}

/// JSON response.
impl IntoResponse for Value {
    fn into_response(self) -> CrownResult<Response> {
        Ok(Response::json(self))
    }
}

impl IntoResponse for Content {
    fn into_response(self) -> CrownResult<Response> {
        let mut response = Response::default();
        response.set_content(self);
        Ok(response)
    }
}

/// On `Ok` the inner value is converted; on `Err` the error is propagated.
impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: Into<CrownError>,
{
    fn into_response(self) -> CrownResult<Response> {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for request handlers.
///
/// # Blanket Implementation
///
/// This trait is automatically implemented for async functions that:
/// - Take 0-8 parameters that implement [`FromRequest`]
/// - Return a type that implements [`IntoResponse`]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Calls the handler for the given request.
    fn call(self, request: Arc<Request>) -> BoxFuture<'static, CrownResult<Response>>;
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in collections
// ============================================================================

/// A type-erased handler that can be stored in collections.
///
/// Internally a closure that captures the original handler and calls it
/// with a cloned copy on each invocation.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<Request>) -> BoxFuture<'static, CrownResult<Response>> + Send + Sync>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |request| f.clone().call(request))
}

// ============================================================================
// Handler implementations for functions (Axum-style)
// ============================================================================

/// Generates Handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoResponse + 'static,
            $( $ty: FromRequest + Send + 'static, )*
        {
            fn call(self, request: Arc<Request>) -> BoxFuture<'static, CrownResult<Response>> {
                Box::pin(async move {
                    $(
                        let $ty = $ty::from_request(&request)?;
                    )*

                    (self)($($ty,)*).await.into_response()
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::UrlPath;
    use serde_json::json;

    #[tokio::test]
    async fn test_zero_arg_handler() {
        let handler = into_handler(|| async { "<p>home</p>" });
        let response = handler(Arc::new(Request::get("/"))).await.unwrap();
        assert_eq!(response.body_string(), "<p>home</p>");
    }

    #[tokio::test]
    async fn test_extracting_handler() {
        async fn echo_path(UrlPath(path): UrlPath, request: Arc<Request>) -> String {
            format!("{path}:{}", request.is_web_request())
        }

        let handler = into_handler(echo_path);
        let response = handler(Arc::new(Request::get("/a/b"))).await.unwrap();
        assert_eq!(response.body_string(), "/a/b:true");
    }

    #[tokio::test]
    async fn test_json_handler() {
        let handler = into_handler(|| async { json!({ "ok": true }) });
        let response = handler(Arc::new(Request::get("/api"))).await.unwrap();
        assert!(response.is_json());
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_handler() {
        use crate::error::ErrorKind;
        use crate::extract::RequestedWith;

        let handler = into_handler(|RequestedWith(value): RequestedWith| async move { value });
        let err = handler(Arc::new(Request::get("/"))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
    }

    #[tokio::test]
    async fn test_failing_handler_propagates() {
        async fn offline() -> CrownResult<Response> {
            Err(CrownError::handler("database offline"))
        }

        let handler = into_handler(offline);
        let err = handler(Arc::new(Request::get("/"))).await.unwrap_err();
        assert_eq!(err.to_string(), "handler failed: database offline");
    }
}
