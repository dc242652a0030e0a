//! Layouts and the registry that names them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::settings::DEFAULT_LAYOUT_NAME;

/// Head and body items handed to a layout so it can place them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSlots {
    /// Newline-joined head items.
    pub head: String,
    /// Newline-joined body items.
    pub body: String,
}

/// Markup placed before and after a response's content.
pub trait Layout: Send + Sync + 'static {
    /// Markup preceding the content.
    fn top(&self, slots: &LayoutSlots) -> String;

    /// Markup following the content.
    fn tail(&self, slots: &LayoutSlots) -> String;

    /// Composes `top + content + tail`.
    fn wrap(&self, content: &str, slots: &LayoutSlots) -> String {
        let top = self.top(slots);
        let tail = self.tail(slots);
        let mut html = String::with_capacity(top.len() + content.len() + tail.len());
        html.push_str(&top);
        html.push_str(content);
        html.push_str(&tail);
        html
    }
}

/// A layout with fixed top and tail markup. Head and body items are ignored.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    top: String,
    tail: String,
}

impl StaticLayout {
    pub fn new(top: impl Into<String>, tail: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            tail: tail.into(),
        }
    }
}

impl Layout for StaticLayout {
    fn top(&self, _slots: &LayoutSlots) -> String {
        self.top.clone()
    }

    fn tail(&self, _slots: &LayoutSlots) -> String {
        self.tail.clone()
    }
}

/// A plain HTML5 document.
///
/// Head items go inside `<head>`, body items right before `</body>`.
#[derive(Debug, Clone, Default)]
pub struct HtmlPageLayout {
    title: Option<String>,
}

impl HtmlPageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title. The title is HTML-escaped.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

const DOCUMENT_HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n";

impl Layout for HtmlPageLayout {
    fn top(&self, slots: &LayoutSlots) -> String {
        let mut html = String::from(DOCUMENT_HEAD);
        if let Some(title) = &self.title {
            html.push_str("<title>");
            html.push_str(&html_escape::encode_text(title));
            html.push_str("</title>\n");
        }
        if !slots.head.is_empty() {
            html.push_str(&slots.head);
            html.push('\n');
        }
        html.push_str("</head>\n<body>\n");
        html
    }

    fn tail(&self, slots: &LayoutSlots) -> String {
        let mut html = String::from("\n");
        if !slots.body.is_empty() {
            html.push_str(&slots.body);
            html.push('\n');
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Shared map from layout names to layouts.
#[derive(Clone, Default)]
pub struct LayoutRegistry {
    layouts: Arc<RwLock<HashMap<String, Arc<dyn Layout>>>>,
}

impl LayoutRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding [`HtmlPageLayout`] as `"html"`.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(DEFAULT_LAYOUT_NAME, HtmlPageLayout::new());
        registry
    }

    /// Registers `layout` under `name`, replacing any previous one.
    pub fn register<L: Layout>(&self, name: impl Into<String>, layout: L) {
        self.register_arc(name, Arc::new(layout));
    }

    /// Registers a shared layout under `name`, replacing any previous one.
    pub fn register_arc(&self, name: impl Into<String>, layout: Arc<dyn Layout>) {
        let name = name.into();
        debug!(layout = %name, "Layout registered");
        self.layouts.write().insert(name, layout);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Layout>> {
        self.layouts.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.layouts.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRegistry")
            .field("layouts", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_layout_wrap() {
        let layout = StaticLayout::new("Top", "Tail");
        assert_eq!(layout.wrap("X", &LayoutSlots::default()), "TopXTail");
    }

    #[test]
    fn test_html_page_places_items() {
        let layout = HtmlPageLayout::new().with_title("A & B");
        let slots = LayoutSlots {
            head: "<link rel=\"stylesheet\" href=\"/a.css\">".to_string(),
            body: "<script src=\"/a.js\"></script>".to_string(),
        };
        let html = layout.wrap("<p>hi</p>", &slots);

        assert!(html.contains("<title>A &amp; B</title>"));
        let head_end = html.find("</head>").unwrap();
        assert!(html.find("a.css").unwrap() < head_end);
        let body_end = html.find("</body>").unwrap();
        let script = html.find("a.js").unwrap();
        let content = html.find("<p>hi</p>").unwrap();
        assert!(content < script && script < body_end);
    }

    #[test]
    fn test_registry_builtin_and_replace() {
        let registry = LayoutRegistry::with_builtin();
        assert!(registry.contains("html"));
        assert!(registry.get("missing").is_none());

        registry.register("html", StaticLayout::new("<", ">"));
        let layout = registry.get("html").unwrap();
        assert_eq!(layout.wrap("x", &LayoutSlots::default()), "<x>");
        assert_eq!(registry.names(), vec!["html"]);
    }
}
