//! Configuration validation utilities.

use tracing_subscriber::filter::Directive;

use super::error::{ConfigError, ConfigResult};
use super::schema::{CrownConfig, LayoutConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CrownConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_layout_config(&config.layout)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    for (target, level) in &logging.filters {
        if target.trim().is_empty() {
            return Err(ConfigError::validation(
                "Log filter target must not be empty",
            ));
        }
        let directive = format!("{target}={}", level.as_str());
        if directive.parse::<Directive>().is_err() {
            return Err(ConfigError::validation(format!(
                "Invalid log filter directive: {directive}"
            )));
        }
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation("max_files must be greater than 0"));
    }

    Ok(())
}

/// Validates layout settings.
fn validate_layout_config(layout: &LayoutConfig) -> ConfigResult<()> {
    if layout.name.trim().is_empty() {
        return Err(ConfigError::validation("Layout name must not be empty"));
    }
    Ok(())
}
