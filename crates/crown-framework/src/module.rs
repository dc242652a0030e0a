//! Module registration and route resolution.
//!
//! [`ModuleRegistry`] is the central owner of all registered modules. It:
//!
//! - Accepts [`Module`]s and lets each one contribute routes and response
//!   filters through a [`ModuleContext`].
//! - Replaces an existing entry **in place** when a module with the same name
//!   is registered again, so the override keeps the original position.
//! - Owns the shared [`Extensions`] map through which modules exchange
//!   handles (for example the layout settings).
//! - Remembers the request currently being served so modules registered
//!   during a request can adapt to it.
//! - Resolves a request to the first matching route, walking modules in
//!   registration order and each module's routes in insertion order.
//!
//! # Example
//!
//! ```rust,ignore
//! use crown_framework::{Module, ModuleContext, ModuleRegistry, Route};
//!
//! struct Pages;
//!
//! impl Module for Pages {
//!     fn name(&self) -> &str {
//!         "pages"
//!     }
//!
//!     fn register(&self, ctx: &mut ModuleContext<'_>) {
//!         ctx.add_route(Route::exact("/").handler(home));
//!     }
//! }
//!
//! let registry = ModuleRegistry::new();
//! registry.register(Pages);
//! let response = registry.generate_response_for_request(Request::get("/")).await?;
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::extensions::Extensions;
use crate::route::Route;
use crown_core::{BoxedResponseFilter, Request, ResponseFilter};

/// A unit of functionality contributing routes and response filters.
///
/// Registration is synchronous; any asynchronous work belongs in handlers.
pub trait Module: Send + Sync + 'static {
    /// Unique name of the module. Registering another module with the same
    /// name replaces this one.
    fn name(&self) -> &str;

    /// Contributes routes, filters and shared state.
    fn register(&self, ctx: &mut ModuleContext<'_>);
}

/// The registration surface handed to [`Module::register`].
pub struct ModuleContext<'a> {
    request: Option<&'a Request>,
    extensions: &'a Extensions,
    routes: Vec<Route>,
    filters: Vec<BoxedResponseFilter>,
}

impl<'a> ModuleContext<'a> {
    fn new(request: Option<&'a Request>, extensions: &'a Extensions) -> Self {
        Self {
            request,
            extensions,
            routes: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// The request being served when the module registers, if any.
    pub fn current_request(&self) -> Option<&Request> {
        self.request
    }

    /// Shared handles visible to every module of the registry.
    pub fn extensions(&self) -> &Extensions {
        self.extensions
    }

    /// Adds a route. Routes are tried in the order they were added.
    pub fn add_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Adds a response filter. Filters run in the order they were added.
    pub fn add_response_filter<F: ResponseFilter>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Adds an already boxed response filter.
    pub fn add_boxed_filter(&mut self, filter: BoxedResponseFilter) -> &mut Self {
        self.filters.push(filter);
        self
    }
}

struct ModuleEntry {
    name: String,
    routes: Vec<Route>,
    filters: Vec<BoxedResponseFilter>,
}

/// Central registry of modules, their routes and their filters.
pub struct ModuleRegistry {
    modules: RwLock<Vec<ModuleEntry>>,
    extensions: Extensions,
    current_request: RwLock<Option<Arc<Request>>>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Creates an empty registry with its own extension map.
    pub fn new() -> Self {
        Self::with_extensions(Extensions::new())
    }

    /// Creates an empty registry sharing `extensions`.
    pub fn with_extensions(extensions: Extensions) -> Self {
        Self {
            modules: RwLock::new(Vec::new()),
            extensions,
            current_request: RwLock::new(None),
        }
    }

    /// Registers `module`.
    ///
    /// If a module with the same name exists its routes and filters are
    /// replaced, keeping its position in the resolution order.
    pub fn register<M: Module>(&self, module: M) {
        let name = module.name().to_string();
        let request = self.current_request();

        let mut ctx = ModuleContext::new(request.as_deref(), &self.extensions);
        module.register(&mut ctx);
        let ModuleContext {
            routes, filters, ..
        } = ctx;

        let route_count = routes.len();
        let filter_count = filters.len();
        let entry = ModuleEntry {
            name: name.clone(),
            routes,
            filters,
        };

        let mut modules = self.modules.write();
        if let Some(existing) = modules.iter_mut().find(|m| m.name == name) {
            *existing = entry;
            info!(
                module = %name,
                routes = route_count,
                filters = filter_count,
                "Module replaced"
            );
        } else {
            modules.push(entry);
            info!(
                module = %name,
                routes = route_count,
                filters = filter_count,
                "Module registered"
            );
        }
    }

    /// Returns the number of registered modules.
    pub fn module_count(&self) -> usize {
        self.modules.read().len()
    }

    /// Returns the names of registered modules in resolution order.
    pub fn module_names(&self) -> Vec<String> {
        self.modules.read().iter().map(|m| m.name.clone()).collect()
    }

    /// Returns the total number of routes.
    pub fn route_count(&self) -> usize {
        self.modules.read().iter().map(|m| m.routes.len()).sum()
    }

    /// Returns the total number of response filters.
    pub fn filter_count(&self) -> usize {
        self.modules.read().iter().map(|m| m.filters.len()).sum()
    }

    /// The shared extension map.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns a clone of the shared handle of type `T`, if one is installed.
    pub fn extension<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.get::<T>()
    }

    /// Records the request currently being served.
    ///
    /// The registry holds a single slot shared by every caller. With
    /// concurrent requests the last call wins, so a module registered while
    /// several requests are in flight sees whichever request was recorded
    /// last.
    pub fn set_current_request(&self, request: Option<Arc<Request>>) {
        *self.current_request.write() = request;
    }

    /// Returns the request currently being served.
    pub fn current_request(&self) -> Option<Arc<Request>> {
        self.current_request.read().clone()
    }

    /// Removes every module and the current request.
    ///
    /// Shared extensions are kept.
    pub fn clear(&self) {
        self.modules.write().clear();
        *self.current_request.write() = None;
        debug!("Module registry cleared");
    }

    /// Returns the first route matching `request`.
    pub fn resolve(&self, request: &Request) -> Option<Route> {
        self.modules
            .read()
            .iter()
            .flat_map(|m| m.routes.iter())
            .find(|route| route.matches(request))
            .cloned()
    }

    /// Returns every response filter in application order.
    pub fn response_filters(&self) -> Vec<BoxedResponseFilter> {
        self.modules
            .read()
            .iter()
            .flat_map(|m| m.filters.iter().cloned())
            .collect()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.module_names())
            .field("extensions", &self.extensions)
            .finish()
    }
}
