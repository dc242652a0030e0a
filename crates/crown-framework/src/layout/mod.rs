//! Layout wrapping for markup responses.
//!
//! - [`LayoutSettings`]: shared enablement, layout name and head/body items
//! - [`Layout`] / [`LayoutRegistry`]: named providers of top and tail markup
//! - [`LayoutFilter`]: the response filter composing `top + content + tail`
//! - [`LayoutModule`]: installs all of the above into a module registry

mod filter;
mod module;
mod provider;
mod settings;

pub use filter::LayoutFilter;
pub use module::LayoutModule;
pub use provider::{HtmlPageLayout, Layout, LayoutRegistry, LayoutSlots, StaticLayout};
pub use settings::{DEFAULT_LAYOUT_NAME, LayoutName, LayoutSettings};
