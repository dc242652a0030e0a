//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use crown_core::CrownError;

/// Errors that can occur while bootstrapping or running an application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The pipeline failed and exception trapping is disabled.
    #[error(transparent)]
    Pipeline(#[from] CrownError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
