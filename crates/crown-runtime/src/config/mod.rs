//! Configuration module for the Crown runtime.
//!
//! Layered loading of logging, layout and exception settings, plus
//! validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, PROFILE_ENV, Profile, load_config, load_config_from_file};
pub use schema::{
    CrownConfig, ExceptionConfig, LayoutConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
