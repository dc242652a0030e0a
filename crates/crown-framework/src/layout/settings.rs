//! Per-application layout state.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

/// Name of the layout used when none is configured.
pub const DEFAULT_LAYOUT_NAME: &str = "html";

/// A layout name, either given directly or computed on demand.
#[derive(Clone)]
pub enum LayoutName {
    /// A fixed name.
    Named(String),
    /// A factory invoked each time the name is resolved.
    Factory(Arc<dyn Fn() -> String + Send + Sync>),
}

impl LayoutName {
    /// Creates a lazily resolved name.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(f))
    }

    /// Returns the concrete name, invoking the factory if there is one.
    pub fn resolve(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Factory(f) => f(),
        }
    }
}

impl Default for LayoutName {
    fn default() -> Self {
        Self::Named(DEFAULT_LAYOUT_NAME.to_string())
    }
}

impl From<&str> for LayoutName {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for LayoutName {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl std::fmt::Debug for LayoutName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Debug)]
struct LayoutState {
    enabled: bool,
    layout: LayoutName,
    head_items: Vec<String>,
    body_items: Vec<String>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            enabled: true,
            layout: LayoutName::default(),
            head_items: Vec::new(),
            body_items: Vec::new(),
        }
    }
}

/// Shared handle to the layout state of one application.
///
/// Clones share the same state. Layout is enabled by default and nothing
/// resets automatically between requests; call [`reset`](Self::reset)
/// explicitly.
#[derive(Debug, Clone, Default)]
pub struct LayoutSettings {
    state: Arc<RwLock<LayoutState>>,
}

impl LayoutSettings {
    /// Creates settings with layout enabled and the built-in layout selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns layout wrapping on. Idempotent.
    pub fn enable_layout(&self) {
        self.state.write().enabled = true;
        debug!("Layout enabled");
    }

    /// Turns layout wrapping off. Idempotent.
    pub fn disable_layout(&self) {
        self.state.write().enabled = false;
        debug!("Layout disabled");
    }

    /// Returns `true` while layout wrapping is turned off.
    pub fn is_disabled(&self) -> bool {
        !self.state.read().enabled
    }

    /// Sets the layout to use, either a name or a factory.
    pub fn set_layout_name(&self, name: impl Into<LayoutName>) {
        self.state.write().layout = name.into();
    }

    /// Resolves the configured layout name.
    pub fn layout_name(&self) -> String {
        let layout = self.state.read().layout.clone();
        layout.resolve()
    }

    /// Appends markup destined for the document head.
    pub fn add_head_item(&self, item: impl Into<String>) {
        self.state.write().head_items.push(item.into());
    }

    /// Appends markup destined for the end of the document body.
    pub fn add_body_item(&self, item: impl Into<String>) {
        self.state.write().body_items.push(item.into());
    }

    /// Head items joined by newlines, in insertion order.
    pub fn head_items_as_html(&self) -> String {
        self.state.read().head_items.join("\n")
    }

    /// Body items joined by newlines, in insertion order.
    pub fn body_items_as_html(&self) -> String {
        self.state.read().body_items.join("\n")
    }

    /// Restores the defaults: enabled, `"html"`, no items.
    pub fn reset(&self) {
        *self.state.write() = LayoutState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults() {
        let settings = LayoutSettings::new();
        assert!(!settings.is_disabled());
        assert_eq!(settings.layout_name(), DEFAULT_LAYOUT_NAME);
        assert_eq!(settings.head_items_as_html(), "");
    }

    #[test]
    fn test_enable_is_idempotent() {
        let settings = LayoutSettings::new();
        settings.enable_layout();
        settings.enable_layout();
        assert!(!settings.is_disabled());

        settings.disable_layout();
        settings.disable_layout();
        assert!(settings.is_disabled());

        settings.enable_layout();
        assert!(!settings.is_disabled());
    }

    #[test]
    fn test_factory_is_resolved_lazily() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let settings = LayoutSettings::new();
        settings.set_layout_name(LayoutName::factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "lazy".to_string()
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(settings.layout_name(), "lazy");
        assert_eq!(settings.layout_name(), "lazy");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_items_are_independent_and_ordered() {
        let settings = LayoutSettings::new();
        settings.add_head_item("a");
        settings.add_head_item("b");
        settings.add_body_item("c");
        settings.add_body_item("c");

        assert_eq!(settings.head_items_as_html(), "a\nb");
        assert_eq!(settings.body_items_as_html(), "c\nc");
    }

    #[test]
    fn test_reset() {
        let settings = LayoutSettings::new();
        let shared = settings.clone();
        shared.disable_layout();
        shared.set_layout_name("custom");
        shared.add_head_item("x");

        settings.reset();
        assert!(!shared.is_disabled());
        assert_eq!(shared.layout_name(), "html");
        assert_eq!(shared.head_items_as_html(), "");
    }
}
