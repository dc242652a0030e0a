//! # Crown
//!
//! A small web framework core that turns requests into responses.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌─────────┐     ┌───────────────────────┐
//! │   Request   │────▶│ ModuleRegistry   │────▶│ Handler │────▶│ ResponseFilter chain  │──▶ Response
//! └─────────────┘     │ (first match)    │     └─────────┘     │ (e.g. LayoutFilter)   │
//!                     └──────────────────┘                     └───────────────────────┘
//!                              │ no match                                  │ failure
//!                              ▼                                           ▼
//!                     NoHandlerForRequest ──────────▶ ExceptionHandler (trap or rethrow)
//! ```
//!
//! - **Modules**: units that contribute routes and response filters
//! - **Handlers**: user-defined async functions (Axum-style)
//! - **Filters**: post-processing of responses, applied in registration order
//! - **Layouts**: named top/tail markup wrapped around markup responses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crown::prelude::*;
//!
//! struct Pages;
//!
//! impl Module for Pages {
//!     fn name(&self) -> &str {
//!         "pages"
//!     }
//!
//!     fn register(&self, ctx: &mut ModuleContext<'_>) {
//!         ctx.add_route(Route::exact("/").handler(|| async { "<h1>Hello</h1>" }));
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> RuntimeResult<()> {
//!     let app = CrownApplication::new();
//!     app.register_module(Pages);
//!
//!     let response = app.try_handle(Request::get("/")).await?;
//!     println!("{}", response.body_string());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use crown_core as core;
pub use crown_framework as framework;
pub use crown_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use crown::prelude::*;
/// ```
pub mod prelude {
    // Application - main entry point
    pub use crown_runtime::{CrownApplication, CrownConfig, RuntimeError, RuntimeResult};

    // Module system
    pub use crown_framework::{Module, ModuleContext, ModuleRegistry, Route};

    // Request / response model and handlers
    pub use crown_core::{
        Content, CrownError, CrownResult, FromRequest, IntoResponse, Method, Request, Response,
        ResponseFilter, StatusCode, UrlPath, filter_fn,
    };

    // Layouts and exceptions
    pub use crown_framework::{
        ExceptionHandler, Layout, LayoutModule, LayoutName, LayoutSettings, LayoutSlots,
        StaticLayout,
    };
}
