//! Crown Runtime - configuration, logging and bootstrap for Crown applications.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `CrownConfig`)
//! - Logging setup on `tracing-subscriber` (`LoggingBuilder`)
//! - The application object tying the pipeline, layout settings and
//!   exception policy together (`CrownApplication`)
//!
//! ```ignore
//! use crown_runtime::CrownApplication;
//!
//! #[tokio::main]
//! async fn main() -> crown_runtime::RuntimeResult<()> {
//!     let app = CrownApplication::builder().profile("production").build()?;
//!     app.register_module(Pages);
//!
//!     let response = app.try_handle(Request::get("/")).await?;
//!     println!("{}", response.body_string());
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use application::{AppService, AppStats, ApplicationBuilder, CrownApplication};
pub use config::{ConfigError, ConfigLoader, ConfigResult, CrownConfig, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
