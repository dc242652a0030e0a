//! Exception trapping.
//!
//! The pipeline never converts failures itself. [`ExceptionHandler`] decides
//! what a caller sees:
//!
//! - **trapping enabled** (default): the error is logged and turned into an
//!   error [`Response`] by the configured responder.
//! - **trapping disabled**: the raw [`CrownError`] is returned so tests and
//!   callers can inspect it.
//!
//! The handler is a cheap, cloneable handle; every clone shares the same
//! trapping flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tower_layer::Layer;
use tracing::{debug, error};

use crown_core::{CrownError, CrownResult, Response};

/// Turns a trapped error into the response shown to the caller.
pub type ErrorResponder = Arc<dyn Fn(&CrownError) -> Response + Send + Sync>;

/// Shared exception policy.
#[derive(Clone)]
pub struct ExceptionHandler {
    trapping: Arc<AtomicBool>,
    responder: ErrorResponder,
}

impl Default for ExceptionHandler {
    fn default() -> Self {
        Self {
            trapping: Arc::new(AtomicBool::new(true)),
            responder: Arc::new(default_error_response),
        }
    }
}

impl ExceptionHandler {
    /// Creates a handler with trapping enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the responder used while trapping.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CrownError) -> Response + Send + Sync + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    /// Converts failures into error responses from now on.
    pub fn enable_exception_trapping(&self) {
        self.trapping.store(true, Ordering::SeqCst);
        debug!("Exception trapping enabled");
    }

    /// Returns failures to the caller unchanged from now on.
    pub fn disable_exception_trapping(&self) {
        self.trapping.store(false, Ordering::SeqCst);
        debug!("Exception trapping disabled");
    }

    /// Returns `true` if failures are converted into responses.
    pub fn is_trapping(&self) -> bool {
        self.trapping.load(Ordering::SeqCst)
    }

    /// Applies the policy to a pipeline result.
    pub fn handle(&self, result: CrownResult<Response>) -> CrownResult<Response> {
        match result {
            Ok(response) => Ok(response),
            Err(err) if self.is_trapping() => {
                error!(
                    kind = ?err.kind(),
                    context = ?err.context(),
                    "{err}"
                );
                Ok((self.responder)(&err))
            }
            Err(err) => Err(err),
        }
    }

    /// A tower layer applying this policy to the wrapped service.
    pub fn layer(&self) -> ExceptionTrappingLayer {
        ExceptionTrappingLayer {
            handler: self.clone(),
        }
    }
}

impl std::fmt::Debug for ExceptionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionHandler")
            .field("trapping", &self.is_trapping())
            .finish()
    }
}

/// Renders `err` as a minimal HTML error page.
///
/// The status is taken from [`CrownError::status_code`].
pub fn default_error_response(err: &CrownError) -> Response {
    let status = err.status_code();
    let title = status.canonical_reason().unwrap_or("Error");
    let message = html_escape::encode_text(&err.message()).into_owned();

    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{code} {title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n<p>{message}</p>\n</body>\n</html>",
        code = status.as_u16(),
    );
    Response::html(page).with_status(status)
}

// ============================================================================
// Tower integration
// ============================================================================

/// Applies an [`ExceptionHandler`] to every result of the inner service.
#[derive(Clone)]
pub struct ExceptionTrappingLayer {
    handler: ExceptionHandler,
}

impl<S> Layer<S> for ExceptionTrappingLayer {
    type Service = ExceptionTrappingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionTrappingService {
            inner,
            handler: self.handler.clone(),
        }
    }
}

pub struct ExceptionTrappingService<S> {
    inner: S,
    handler: ExceptionHandler,
}

impl<S> Clone for ExceptionTrappingService<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        ExceptionTrappingService {
            inner: self.inner.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<S, R> Service<R> for ExceptionTrappingService<S>
where
    S: Service<R, Response = Response, Error = CrownError>,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = CrownError;
    type Future = BoxFuture<'static, CrownResult<Response>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        let fut = self.inner.call(request);
        let handler = self.handler.clone();
        async move { handler.handle(fut.await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crown_core::{Request, StatusCode};
    use tower::{ServiceBuilder, ServiceExt, service_fn};

    #[test]
    fn test_trapping_converts_errors() {
        let handler = ExceptionHandler::new();
        assert!(handler.is_trapping());

        let request = Arc::new(Request::get("/nope"));
        let response = handler
            .handle(Err(CrownError::no_handler(request)))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.body_string();
        assert!(body.contains("could not be found"));
    }

    #[test]
    fn test_disabled_trapping_rethrows() {
        let handler = ExceptionHandler::new();
        let clone = handler.clone();
        clone.disable_exception_trapping();
        assert!(!handler.is_trapping());

        let err = handler
            .handle(Err(CrownError::layout_not_found("missing")))
            .unwrap_err();
        assert_eq!(err.to_string(), "layout 'missing' could not be found");

        handler.enable_exception_trapping();
        assert!(clone.is_trapping());
    }

    #[test]
    fn test_error_page_is_escaped() {
        let response = default_error_response(&CrownError::handler("<script>"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body_string().contains("&lt;script&gt;"));
        assert!(!response.body_string().contains("<script>"));
    }

    #[test]
    fn test_custom_responder() {
        fn teapot(err: &CrownError) -> Response {
            Response::html(err.message()).with_status(StatusCode::IM_A_TEAPOT)
        }

        let handler = ExceptionHandler::new().with_responder(teapot);
        let response = handler.handle(Err(CrownError::custom("tea"))).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.body_string(), "tea");
    }

    #[test]
    fn test_layer_traps_service_errors() {
        let handler = ExceptionHandler::new();
        let unrouted = service_fn(|request: Request| async move {
            Err::<Response, _>(CrownError::no_handler(Arc::new(request)))
        });
        let service = ServiceBuilder::new()
            .layer(handler.layer())
            .service(unrouted);

        let response = tokio_test::block_on(service.clone().oneshot(Request::get("/x"))).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        handler.disable_exception_trapping();
        let err = tokio_test::block_on(service.oneshot(Request::get("/x"))).unwrap_err();
        assert_eq!(err.request().unwrap().path(), "/x");
    }
}
