//! The request-to-response pipeline.
//!
//! ```text
//! Request ──▶ resolve route ──▶ handler ──▶ filter 1 ──▶ … ──▶ filter N ──▶ Response
//!                  │
//!                  └─ no match ──▶ CrownError::NoHandlerForRequest
//! ```
//!
//! Failures are returned as-is; turning them into error pages is the job of
//! the [`ExceptionHandler`](crate::exception::ExceptionHandler).

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, debug, info_span, trace};

use crate::module::ModuleRegistry;
use crown_core::{BoxedResponseFilter, CrownError, CrownResult, Request, Response};

impl ModuleRegistry {
    /// Produces the response for `request`.
    ///
    /// Resolves the first matching route, runs its handler and passes the
    /// result through every registered response filter in order.
    ///
    /// # Errors
    ///
    /// [`CrownError::NoHandlerForRequest`] when no route matches, or any error
    /// raised by the handler or a filter.
    pub async fn generate_response_for_request(
        &self,
        request: impl Into<Arc<Request>>,
    ) -> CrownResult<Response> {
        let request = request.into();
        let span = info_span!(
            "request",
            path = %request.path(),
            method = %request.method(),
        );

        async move {
            let Some(route) = self.resolve(&request) else {
                debug!("No route matched");
                return Err(CrownError::no_handler(request));
            };
            let name = route.get_name().unwrap_or("unnamed");
            debug!(route = name, "Route resolved");

            let response = route.call_handler(request).await?;
            apply_filters(&self.response_filters(), response)
        }
        .instrument(span)
        .await
    }
}

/// Runs `response` through `filters` in order, stopping at the first failure.
pub fn apply_filters(filters: &[BoxedResponseFilter], response: Response) -> CrownResult<Response> {
    filters.iter().try_fold(response, |response, filter| {
        trace!(filter = filter.name(), "Applying response filter");
        filter.process_response(response)
    })
}

/// The pipeline as a tower service.
///
/// Each call records its request as the registry's current request before
/// generating the response.
///
/// ```rust,ignore
/// let service = ServiceBuilder::new()
///     .layer(exception_handler.layer())
///     .service(Pipeline::new(registry));
/// ```
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<ModuleRegistry>,
}

impl Pipeline {
    /// Wraps `registry`.
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self { registry }
    }

    /// The wrapped registry.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }
}

impl Service<Request> for Pipeline {
    type Response = Response;
    type Error = CrownError;
    type Future = BoxFuture<'static, CrownResult<Response>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    // Records the request in the registry-wide slot before routing it.
    fn call(&mut self, request: Request) -> Self::Future {
        let registry = Arc::clone(&self.registry);
        let request = Arc::new(request);
        registry.set_current_request(Some(Arc::clone(&request)));
        async move { registry.generate_response_for_request(request).await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Module, ModuleContext};
    use crate::route::Route;
    use crown_core::{ErrorKind, filter_fn};
    use serde_json::json;
    use tower::ServiceExt;

    struct Site;

    async fn api() -> serde_json::Value {
        json!({ "ok": true })
    }

    fn wrap(mut response: Response) -> CrownResult<Response> {
        if let Some(markup) = response.content().as_markup() {
            let wrapped = format!("[{markup}]");
            response.set_content(wrapped);
        }
        Ok(response)
    }

    fn exclaim(mut response: Response) -> CrownResult<Response> {
        if let Some(markup) = response.content().as_markup() {
            let loud = format!("{markup}!");
            response.set_content(loud);
        }
        Ok(response)
    }

    impl Module for Site {
        fn name(&self) -> &str {
            "site"
        }

        fn register(&self, ctx: &mut ModuleContext<'_>) {
            ctx.add_route(Route::exact("/").handler(|| async { "home" }))
                .add_route(Route::exact("/api").handler(api))
                .add_response_filter(filter_fn("wrap", wrap))
                .add_response_filter(filter_fn("exclaim", exclaim));
        }
    }

    #[tokio::test]
    async fn test_filters_apply_in_order() {
        let registry = ModuleRegistry::new();
        registry.register(Site);

        let response = registry
            .generate_response_for_request(Request::get("/"))
            .await
            .unwrap();
        assert_eq!(response.body_string(), "[home]!");

        let response = registry
            .generate_response_for_request(Request::get("/api"))
            .await
            .unwrap();
        assert_eq!(response.content().as_json(), Some(&json!({ "ok": true })));
    }

    #[tokio::test]
    async fn test_unrouteable_request_references_original() {
        let registry = ModuleRegistry::new();
        registry.register(Site);

        let request = Arc::new(Request::get("/missing"));
        let err = registry
            .generate_response_for_request(Arc::clone(&request))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Routing);
        assert_eq!(
            err.message(),
            "A handler for request this could not be found."
        );
        assert!(Arc::ptr_eq(err.request().unwrap(), &request));
    }

    #[tokio::test]
    async fn test_filter_failure_propagates() {
        struct Failing;

        impl Module for Failing {
            fn name(&self) -> &str {
                "failing"
            }

            fn register(&self, ctx: &mut ModuleContext<'_>) {
                ctx.add_response_filter(filter_fn("boom", |_| Err(CrownError::custom("boom"))));
            }
        }

        let registry = ModuleRegistry::new();
        registry.register(Site);
        registry.register(Failing);

        let err = registry
            .generate_response_for_request(Request::get("/"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_pipeline_service() {
        let registry = Arc::new(ModuleRegistry::new());
        registry.register(Site);

        let response = Pipeline::new(Arc::clone(&registry))
            .oneshot(Request::get("/"))
            .await
            .unwrap();
        assert_eq!(response.body_string(), "[home]!");
        assert_eq!(registry.current_request().unwrap().path(), "/");
    }

    #[tokio::test]
    async fn test_overlapping_calls_share_current_request() {
        let registry = Arc::new(ModuleRegistry::new());
        registry.register(Site);
        let mut pipeline = Pipeline::new(Arc::clone(&registry));

        let first = pipeline.call(Request::get("/"));
        let second = pipeline.call(Request::get("/api"));
        assert_eq!(registry.current_request().unwrap().path(), "/api");

        assert_eq!(first.await.unwrap().body_string(), "[home]!");
        assert!(second.await.unwrap().is_json());
    }
}
