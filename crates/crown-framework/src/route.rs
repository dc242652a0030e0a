//! Routes: handlers paired with a request check.
//!
//! A [`Route`] groups a single handler with a "check" rule. Routes are
//! contributed by modules; the pipeline picks the first route whose check
//! passes for the incoming request.
//!
//! # Tower Service Integration
//!
//! `Route` implements `tower::Service<Arc<Request>>`, so middleware can be
//! applied to a single route:
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//!
//! let route = Route::prefix("/simple/").handler(simple_page);
//!
//! let service = ServiceBuilder::new()
//!     .layer(exception_handler.layer())
//!     .service(route);
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use crown_framework::Route;
//!
//! // Exact path
//! let route = Route::exact("/").handler(home);
//!
//! // Everything under /api/, only for POST
//! let route = Route::prefix("/api/").method(Method::POST).handler(api);
//!
//! // Custom check
//! let route = Route::new()
//!     .check(|request| request.is_ajax())
//!     .handler(ajax_fallback);
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;
use tracing::trace;

use crown_core::{
    BoxedHandler, CrownError, CrownResult, Handler, Method, Request, Response, into_handler,
};

/// A type-erased check function.
pub type CheckFn = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Internal data for a Route.
///
/// Wrapped in an `Arc` to enable cheap cloning; `Clone` supports
/// `Arc::make_mut` for copy-on-write building.
#[derive(Clone)]
struct RouteInner {
    /// Decides whether this route serves the request.
    check_fn: Option<CheckFn>,

    /// Restricts the route to one HTTP method.
    method: Option<Method>,

    /// The handler producing the response.
    handler: Option<BoxedHandler>,

    /// Optional name for debugging.
    name: Option<String>,
}

/// A handler with a common check rule.
///
/// A route without a handler never matches.
#[derive(Clone)]
pub struct Route {
    inner: Arc<RouteInner>,
}

impl Default for Route {
    fn default() -> Self {
        Self::new()
    }
}

impl Route {
    /// Creates a new route.
    ///
    /// A route with no check matches every request.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RouteInner {
                check_fn: None,
                method: None,
                handler: None,
                name: None,
            }),
        }
    }

    /// Creates a route matching exactly `path`.
    pub fn exact(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new()
            .name(path.clone())
            .check(move |request| request.path() == path)
    }

    /// Creates a route matching every path that starts with `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new()
            .name(format!("{prefix}*"))
            .check(move |request| request.path().starts_with(prefix.as_str()))
    }

    /// Gets mutable access to inner, cloning it if shared.
    fn inner_mut(&mut self) -> &mut RouteInner {
        Arc::make_mut(&mut self.inner)
    }

    /// Sets a name for this route (useful for debugging).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner_mut().name = Some(name.into());
        self
    }

    /// Sets a custom check function, replacing any previous one.
    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.inner_mut().check_fn = Some(Arc::new(f));
        self
    }

    /// Restricts this route to requests using `method`.
    pub fn method(mut self, method: Method) -> Self {
        self.inner_mut().method = Some(method);
        self
    }

    /// Sets the handler.
    pub fn handler<F, T>(mut self, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.inner_mut().handler = Some(into_handler(f));
        self
    }

    /// Sets a pre-built boxed handler.
    pub fn handler_boxed(mut self, handler: BoxedHandler) -> Self {
        self.inner_mut().handler = Some(handler);
        self
    }

    /// Checks if this route should serve the given request.
    pub fn matches(&self, request: &Request) -> bool {
        if self.inner.handler.is_none() {
            return false;
        }
        if let Some(method) = &self.inner.method
            && request.method() != method
        {
            return false;
        }
        match &self.inner.check_fn {
            Some(f) => f(request),
            None => true,
        }
    }

    /// Returns the name of this route, if set.
    pub fn get_name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Runs the handler for `request` without checking the route.
    pub fn call_handler(&self, request: Arc<Request>) -> BoxFuture<'static, CrownResult<Response>> {
        match &self.inner.handler {
            Some(handler) => {
                trace!(
                    route = self.get_name().unwrap_or("unnamed"),
                    "Executing handler"
                );
                handler(request)
            }
            None => Box::pin(async move { Err(CrownError::no_handler(request)) }),
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.inner.name)
            .field("method", &self.inner.method)
            .field("has_handler", &self.inner.handler.is_some())
            .finish()
    }
}

// ============================================================================
// Tower Service Implementation for Route
// ============================================================================

/// Tower Service implementation for Route.
///
/// Requests the route does not match fail with
/// [`CrownError::NoHandlerForRequest`].
impl Service<Arc<Request>> for Route {
    type Response = Response;
    type Error = CrownError;
    type Future = Pin<Box<dyn std::future::Future<Output = CrownResult<Response>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Arc<Request>) -> Self::Future {
        if !self.matches(&request) {
            return Box::pin(async move { Err(CrownError::no_handler(request)) });
        }
        self.call_handler(request)
    }
}
