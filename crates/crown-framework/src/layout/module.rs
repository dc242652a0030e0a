use std::sync::Arc;

use tracing::debug;

use super::filter::LayoutFilter;
use super::provider::{Layout, LayoutRegistry};
use super::settings::{LayoutName, LayoutSettings};
use crate::extensions::Extensions;
use crate::module::{Module, ModuleContext};

/// Installs layout wrapping into a [`ModuleRegistry`](crate::ModuleRegistry).
///
/// On registration the module:
///
/// 1. installs (or reuses) the shared [`LayoutSettings`] and
///    [`LayoutRegistry`] handles,
/// 2. registers its own layouts and sets its layout name,
/// 3. disables layout if the current request is an AJAX call,
/// 4. adds a [`LayoutFilter`].
///
/// Registering again replaces the earlier instance, so the later layout
/// name wins.
///
/// ```rust,ignore
/// registry.register(
///     LayoutModule::new("site").with_layout("site", StaticLayout::new("<main>", "</main>")),
/// );
/// ```
pub struct LayoutModule {
    layout_name: LayoutName,
    layouts: Vec<(String, Arc<dyn Layout>)>,
}

impl Default for LayoutModule {
    fn default() -> Self {
        Self::new(LayoutName::default())
    }
}

impl LayoutModule {
    pub const NAME: &'static str = "layout";

    /// Creates a module selecting `layout_name`.
    pub fn new(layout_name: impl Into<LayoutName>) -> Self {
        Self {
            layout_name: layout_name.into(),
            layouts: Vec::new(),
        }
    }

    /// Registers `layout` under `name` when the module registers.
    pub fn with_layout<L: Layout>(mut self, name: impl Into<String>, layout: L) -> Self {
        self.layouts.push((name.into(), Arc::new(layout)));
        self
    }

    /// The shared settings stored in `extensions`, created on first use.
    pub fn settings(extensions: &Extensions) -> LayoutSettings {
        extensions.get_or_default::<LayoutSettings>()
    }

    /// The shared layout registry stored in `extensions`, created on first use.
    pub fn layouts(extensions: &Extensions) -> LayoutRegistry {
        extensions.get_or_insert_with(LayoutRegistry::with_builtin)
    }
}

impl Module for LayoutModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register(&self, ctx: &mut ModuleContext<'_>) {
        let settings = Self::settings(ctx.extensions());
        let layouts = Self::layouts(ctx.extensions());

        for (name, layout) in &self.layouts {
            layouts.register_arc(name.clone(), Arc::clone(layout));
        }
        settings.set_layout_name(self.layout_name.clone());

        if ctx.current_request().is_some_and(|req| req.is_ajax()) {
            debug!("AJAX request, disabling layout");
            settings.disable_layout();
        }

        ctx.add_response_filter(LayoutFilter::new(settings, layouts));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ExceptionHandler;
    use crate::layout::StaticLayout;
    use crate::module::ModuleRegistry;
    use crate::route::Route;
    use crown_core::{ErrorKind, Request, Response};
    use serde_json::json;

    const SIMPLE_CONTENT: &str = "Don't change this content - it should match the unit test.";

    struct SimplePage;

    impl Module for SimplePage {
        fn name(&self) -> &str {
            "simple-page"
        }

        fn register(&self, ctx: &mut ModuleContext<'_>) {
            ctx.add_route(Route::prefix("/simple/").handler(simple_page))
                .add_route(Route::prefix("/json/").handler(json_page));
        }
    }

    async fn simple_page() -> &'static str {
        SIMPLE_CONTENT
    }

    async fn json_page() -> serde_json::Value {
        json!({ "Field": "Value" })
    }

    fn top_tail() -> StaticLayout {
        StaticLayout::new("Top", "Tail")
    }

    fn requested_with(value: &str) -> Arc<Request> {
        Arc::new(Request::builder().header("X-Requested-With", value).build())
    }

    fn registry_with(layout: LayoutModule) -> ModuleRegistry {
        let registry = ModuleRegistry::new();
        registry.register(SimplePage);
        registry.register(layout);
        registry
    }

    async fn get(registry: &ModuleRegistry, path: &str) -> crown_core::CrownResult<Response> {
        registry
            .generate_response_for_request(Request::get(path))
            .await
    }

    #[tokio::test]
    async fn test_layout_wraps_content() {
        let registry = registry_with(LayoutModule::new("test").with_layout("test", top_tail()));

        let response = get(&registry, "/simple/").await.unwrap();
        assert_eq!(response.body_string(), format!("Top{SIMPLE_CONTENT}Tail"));
    }

    #[tokio::test]
    async fn test_missing_layout_fails() {
        let registry = registry_with(LayoutModule::new("missing"));
        let handler = ExceptionHandler::new();
        handler.disable_exception_trapping();

        let result = get(&registry, "/simple/").await;
        let err = handler.handle(result).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LayoutResolution);
    }

    #[tokio::test]
    async fn test_factory_layout_name() {
        let layout = LayoutModule::new(LayoutName::factory(|| "test".to_string()));
        let registry = registry_with(layout.with_layout("test", top_tail()));

        let response = get(&registry, "/simple/").await.unwrap();
        assert_eq!(response.body_string(), format!("Top{SIMPLE_CONTENT}Tail"));
    }

    #[tokio::test]
    async fn test_json_is_untouched() {
        let registry = registry_with(LayoutModule::new("missing"));

        let response = get(&registry, "/json/").await.unwrap();
        assert_eq!(
            response.content().as_json(),
            Some(&json!({ "Field": "Value" }))
        );
    }

    #[tokio::test]
    async fn test_disabled_layout_is_untouched() {
        let registry = registry_with(LayoutModule::new("missing"));
        LayoutModule::settings(registry.extensions()).disable_layout();

        let response = get(&registry, "/simple/").await.unwrap();
        assert_eq!(response.body_string(), SIMPLE_CONTENT);
    }

    #[test]
    fn test_ajax_request_disables_layout() {
        let registry = ModuleRegistry::new();
        registry.set_current_request(Some(requested_with("XMLHttpRequest")));
        registry.register(LayoutModule::default());

        assert!(LayoutModule::settings(registry.extensions()).is_disabled());
    }

    #[test]
    fn test_other_requests_leave_enablement() {
        let registry = ModuleRegistry::new();
        registry.set_current_request(Some(requested_with("some-odd-request")));
        registry.register(LayoutModule::default());
        let settings = LayoutModule::settings(registry.extensions());
        assert!(!settings.is_disabled());

        settings.disable_layout();
        registry.set_current_request(None);
        registry.register(LayoutModule::default());
        assert!(settings.is_disabled());
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = ModuleRegistry::new();
        registry.register(LayoutModule::new("first"));
        registry.register(LayoutModule::new("second"));

        assert_eq!(registry.filter_count(), 1);
        assert_eq!(
            LayoutModule::settings(registry.extensions()).layout_name(),
            "second"
        );
    }

    #[tokio::test]
    async fn test_items_reach_builtin_layout() {
        let registry = registry_with(LayoutModule::default());
        let settings = LayoutModule::settings(registry.extensions());
        settings.add_head_item("<meta name=\"a\">");
        settings.add_body_item("<script></script>");

        let html = get(&registry, "/simple/").await.unwrap().body_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(SIMPLE_CONTENT));
        let head_end = html.find("</head>").unwrap();
        let body_end = html.find("</body>").unwrap();
        assert!(html.find("<meta name=\"a\">").unwrap() < head_end);
        assert!(html.find("<script></script>").unwrap() < body_end);
    }
}
