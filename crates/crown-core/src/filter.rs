//! Response filters.
//!
//! A [`ResponseFilter`] post-processes a generated [`Response`] before it is
//! returned to the transport layer. Filters are applied in registration order;
//! each receives the response produced so far and returns the one to pass on.

use std::sync::Arc;

use crate::error::CrownResult;
use crate::response::Response;

/// Post-processes responses produced by handlers.
pub trait ResponseFilter: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Inspects, mutates or replaces `response`.
    fn process_response(&self, response: Response) -> CrownResult<Response>;
}

/// A type-erased filter that can be stored in collections.
pub type BoxedResponseFilter = Arc<dyn ResponseFilter>;

/// A filter backed by a closure. Created by [`filter_fn`].
pub struct FilterFn<F> {
    name: String,
    f: F,
}

impl<F> ResponseFilter for FilterFn<F>
where
    F: Fn(Response) -> CrownResult<Response> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process_response(&self, response: Response) -> CrownResult<Response> {
        (self.f)(response)
    }
}

/// Wraps a closure as a named [`ResponseFilter`].
///
/// ```rust,ignore
/// let no_cache = filter_fn("no-cache", |response: Response| {
///     Ok(response.with_header("Cache-Control", "no-store"))
/// });
/// ```
pub fn filter_fn<F>(name: impl Into<String>, f: F) -> FilterFn<F>
where
    F: Fn(Response) -> CrownResult<Response> + Send + Sync + 'static,
{
    FilterFn {
        name: name.into(),
        f,
    }
}
