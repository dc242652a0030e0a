use std::sync::Arc;

use crown_core::{ErrorKind, Request, Response, StatusCode};
use crown_framework::{LayoutModule, Module, ModuleContext, Route, StaticLayout};
use crown_runtime::{CrownApplication, CrownConfig, RuntimeError, RuntimeResult};
use serde_json::json;
use tower::ServiceExt;

struct Pages;

async fn home() -> &'static str {
    "<p>home</p>"
}

async fn items() -> serde_json::Value {
    json!({ "Field": "Value" })
}

impl Module for Pages {
    fn name(&self) -> &str {
        "pages"
    }

    fn register(&self, ctx: &mut ModuleContext<'_>) {
        ctx.add_route(Route::exact("/").handler(home))
            .add_route(Route::prefix("/api/").handler(items));
    }
}

fn app_with(configure: impl FnOnce(&mut CrownConfig)) -> CrownApplication {
    let mut config = CrownConfig::default();
    configure(&mut config);
    let app = CrownApplication::from_config(&config);
    app.register_module(Pages);
    app
}

fn ajax(path: &str) -> Request {
    Request::builder()
        .path(path)
        .header("X-Requested-With", "XMLHttpRequest")
        .build()
}

#[tokio::test]
async fn serves_pages_in_builtin_layout() {
    let app = app_with(|_| {});
    let layout = app.layout();
    layout.add_head_item("<link rel=\"stylesheet\" href=\"/site.css\">");

    let response = app.handle(Request::get("/")).await.unwrap();
    let html = response.body_string();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<p>home</p>"));
    let head_end = html.find("</head>").unwrap();
    assert!(html.find("site.css").unwrap() < head_end);
}

#[tokio::test]
async fn json_is_never_wrapped() {
    let app = app_with(|_| {});

    let response = app.handle(Request::get("/api/items")).await.unwrap();
    assert_eq!(
        response.content().as_json(),
        Some(&json!({ "Field": "Value" }))
    );
}

#[tokio::test]
async fn trapped_routing_failure_is_404_page() {
    let app = app_with(|_| {});

    let response = app.handle(Request::get("/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(
        response
            .body_string()
            .contains("A handler for request this could not be found.")
    );
}

#[tokio::test]
async fn untrapped_failures_reach_the_caller() {
    let app = app_with(|config| config.exceptions.trapping = false);

    let err = app.handle(Request::get("/missing")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Routing);
    assert_eq!(err.request().unwrap().path(), "/missing");

    let err = app.try_handle(Request::get("/missing")).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Pipeline(_)));
}

#[tokio::test]
async fn unknown_layout_name_fails_resolution() {
    let app = app_with(|config| {
        config.layout.name = "nope".to_string();
        config.exceptions.trapping = false;
    });

    let err = app.handle(Request::get("/")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LayoutResolution);

    app.exception_handler().enable_exception_trapping();
    let response = app.handle(Request::get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn disabled_layout_from_config() {
    let app = app_with(|config| config.layout.enabled = false);

    let response = app.handle(Request::get("/")).await.unwrap();
    assert_eq!(response.body_string(), "<p>home</p>");
    assert!(!app.stats().layout_enabled);
}

#[tokio::test]
async fn layout_module_registered_during_ajax_request_disables_layout() {
    struct LateLayout;

    impl Module for LateLayout {
        fn name(&self) -> &str {
            "late"
        }

        fn register(&self, ctx: &mut ModuleContext<'_>) {
            ctx.add_route(Route::exact("/late").handler(|| async { "late" }));
        }
    }

    let app = app_with(|_| {});
    app.handle(ajax("/")).await.unwrap();
    // The request alone does not change enablement.
    assert!(!app.layout().is_disabled());

    app.register_module(LateLayout);
    let top_tail = StaticLayout::new("Top", "Tail");
    app.register_module(LayoutModule::new("bare").with_layout("bare", top_tail));
    assert!(app.layout().is_disabled());

    app.layout().enable_layout();
    let response = app.handle(Request::get("/late")).await.unwrap();
    assert_eq!(response.body_string(), "ToplateTail");
}

#[tokio::test]
async fn replacing_the_layout_module_keeps_one_filter() {
    let app = app_with(|_| {});
    let before = app.stats();

    let brackets = StaticLayout::new("[", "]");
    app.register_module(LayoutModule::new("bare").with_layout("bare", brackets));
    let after = app.stats();

    assert_eq!(before.filters, after.filters);
    assert_eq!(after.layout_name, "bare");
    let response = app.handle(Request::get("/")).await.unwrap();
    assert_eq!(response.body_string(), "[<p>home</p>]");
}

#[tokio::test]
async fn service_is_reusable() {
    let app = app_with(|_| {});
    let service = app.service();

    let first = service.clone().oneshot(Request::get("/")).await.unwrap();
    let second = service.oneshot(Request::get("/missing")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_reflect_registrations() -> RuntimeResult<()> {
    let app = app_with(|_| {});
    let stats = app.stats();

    assert_eq!(stats.modules, 2);
    assert_eq!(stats.routes, 2);
    assert_eq!(stats.filters, 1);
    assert_eq!(stats.layout_name, "html");
    assert!(stats.trapping);
    assert!(stats.to_string().starts_with("Modules: 2"));

    let response: Response = app.try_handle(Request::get("/")).await?;
    assert!(response.is_markup());
    Ok(())
}

#[tokio::test]
async fn current_request_is_the_last_handled() {
    let app = app_with(|_| {});
    let request = Request::get("/api/x");
    app.handle(request.clone()).await.unwrap();

    let current: Arc<Request> = app.registry().current_request().unwrap();
    assert_eq!(*current, request);
}

#[test]
fn builder_keyed_override_leaves_other_settings() {
    let dir = std::env::temp_dir().join(format!("crown-builder-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut base = CrownConfig::default();
    base.layout.name = "site".to_string();

    let app = CrownApplication::builder()
        .search_path(&dir)
        .without_env()
        .merge(base)
        .set("exceptions.trapping", false)
        .build()
        .unwrap();

    assert_eq!(app.config().layout.name, "site");
    assert!(!app.config().exceptions.trapping);
    assert!(!app.exception_handler().is_trapping());
}
