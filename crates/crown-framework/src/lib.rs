//! # Crown Framework
//!
//! Composition of modules into a request-to-response pipeline.
//!
//! This layer provides:
//! - Routes pairing handlers with request checks
//! - The module registry, the single place where modules contribute routes
//!   and response filters
//! - The pipeline entry point `generate_response_for_request`, also available
//!   as a tower service
//! - Exception trapping as a shared handle and a tower layer
//! - The layout module wrapping markup responses in named layouts

pub mod exception;
pub mod extensions;
pub mod layout;
pub mod module;
pub mod pipeline;
pub mod route;

pub use exception::{
    ErrorResponder, ExceptionHandler, ExceptionTrappingLayer, ExceptionTrappingService,
    default_error_response,
};
pub use extensions::Extensions;
pub use layout::{
    HtmlPageLayout, Layout, LayoutFilter, LayoutModule, LayoutName, LayoutRegistry, LayoutSettings,
    LayoutSlots, StaticLayout,
};
pub use module::{Module, ModuleContext, ModuleRegistry};
pub use pipeline::{Pipeline, apply_filters};
pub use route::{CheckFn, Route};
