//! Application bootstrap.
//!
//! [`CrownApplication`] owns everything one site needs: the module registry,
//! the layout settings and the exception policy, all seeded from a
//! [`CrownConfig`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use crown_runtime::CrownApplication;
//!
//! // Loads crown.toml from the current directory, if any
//! let app = CrownApplication::new();
//! app.register_module(Pages);
//!
//! let response = app.handle(Request::get("/")).await?;
//!
//! // Or with explicit configuration
//! let app = CrownApplication::builder()
//!     .config_file("config/crown.toml")
//!     .profile("production")
//!     .build()?;
//! ```

use std::sync::Arc;

use serde::Serialize;
use tower::util::BoxCloneSyncService;
use tower::{ServiceBuilder, ServiceExt};
use tracing::info;

use crate::config::{ConfigLoader, CrownConfig};
use crate::error::RuntimeResult;
use crate::logging;
use crown_core::{CrownError, CrownResult, Request, Response};
use crown_framework::{
    ExceptionHandler, LayoutModule, LayoutSettings, Module, ModuleRegistry, Pipeline,
};

/// The request pipeline wrapped in the exception policy, as a tower service.
pub type AppService = BoxCloneSyncService<Request, Response, CrownError>;

/// A configured Crown application.
pub struct CrownApplication {
    config: CrownConfig,
    registry: Arc<ModuleRegistry>,
    layout: LayoutSettings,
    exceptions: ExceptionHandler,
}

impl Default for CrownApplication {
    fn default() -> Self {
        Self::new()
    }
}

impl CrownApplication {
    /// Creates an application, loading configuration from the current
    /// directory.
    ///
    /// If loading fails, default settings are used.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                CrownConfig::default()
            });

        Self::from_config(&config)
    }

    /// Creates an application builder for custom configuration.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Creates an application from configuration.
    ///
    /// Initializes logging, installs a [`LayoutModule`] for the configured
    /// layout name and applies the layout and exception settings.
    pub fn from_config(config: &CrownConfig) -> Self {
        logging::init_from_config(&config.logging);

        let registry = Arc::new(ModuleRegistry::new());
        registry.register(LayoutModule::new(config.layout.name.as_str()));

        let layout = LayoutModule::settings(registry.extensions());
        if !config.layout.enabled {
            layout.disable_layout();
        }

        let exceptions = ExceptionHandler::new();
        if !config.exceptions.trapping {
            exceptions.disable_exception_trapping();
        }

        info!(
            log_level = %config.logging.level,
            layout = %config.layout.name,
            layout_enabled = config.layout.enabled,
            trapping = config.exceptions.trapping,
            "Application initialized from configuration"
        );

        Self {
            config: config.clone(),
            registry,
            layout,
            exceptions,
        }
    }

    /// The configuration the application was built from.
    pub fn config(&self) -> &CrownConfig {
        &self.config
    }

    /// Registers a module. A module with the same name is replaced.
    pub fn register_module<M: Module>(&self, module: M) -> &Self {
        self.registry.register(module);
        self
    }

    /// The module registry backing the pipeline.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// The shared layout settings.
    pub fn layout(&self) -> &LayoutSettings {
        &self.layout
    }

    /// The shared exception policy.
    pub fn exception_handler(&self) -> &ExceptionHandler {
        &self.exceptions
    }

    /// The pipeline wrapped in the exception policy.
    pub fn service(&self) -> AppService {
        let service = ServiceBuilder::new()
            .layer(self.exceptions.layer())
            .service(Pipeline::new(Arc::clone(&self.registry)));
        BoxCloneSyncService::new(service)
    }

    /// Produces the response for `request`.
    ///
    /// With trapping enabled failures become error pages; otherwise they are
    /// returned.
    ///
    /// The layout module checks for AJAX requests only when it is registered,
    /// and the application registers it before any request is served. AJAX
    /// fragments are therefore still wrapped unless a [`LayoutModule`] is
    /// registered again while the request is current, or the layout is
    /// disabled through [`layout`](Self::layout).
    pub async fn handle(&self, request: Request) -> CrownResult<Response> {
        self.service().oneshot(request).await
    }

    /// Like [`handle`](Self::handle), with the failure as a [`RuntimeError`](crate::RuntimeError).
    pub async fn try_handle(&self, request: Request) -> RuntimeResult<Response> {
        Ok(self.handle(request).await?)
    }

    /// Returns a snapshot of the application state.
    pub fn stats(&self) -> AppStats {
        AppStats {
            modules: self.registry.module_count(),
            routes: self.registry.route_count(),
            filters: self.registry.filter_count(),
            layout_enabled: !self.layout.is_disabled(),
            layout_name: self.layout.layout_name(),
            trapping: self.exceptions.is_trapping(),
        }
    }
}

/// Builder for [`CrownApplication`].
pub struct ApplicationBuilder {
    config_loader: ConfigLoader,
}

impl ApplicationBuilder {
    /// Creates a builder searching the current directory for config files.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading `CROWN_*` environment variables (default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a complete configuration underneath files and environment.
    pub fn merge(mut self, config: CrownConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Overrides a single configuration value by its dotted key.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Loads configuration and builds the application.
    pub fn build(self) -> RuntimeResult<CrownApplication> {
        let config = self.config_loader.load()?;
        Ok(CrownApplication::from_config(&config))
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of an application's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppStats {
    pub modules: usize,
    pub routes: usize,
    pub filters: usize,
    pub layout_enabled: bool,
    pub layout_name: String,
    pub trapping: bool,
}

impl std::fmt::Display for AppStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Modules: {} ({} routes, {} filters), layout '{}' {}, trapping {}",
            self.modules,
            self.routes,
            self.filters,
            self.layout_name,
            if self.layout_enabled { "enabled" } else { "disabled" },
            if self.trapping { "on" } else { "off" },
        )
    }
}
