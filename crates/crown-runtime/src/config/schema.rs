//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CrownConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Layout wrapping settings.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Exception trapping settings.
    #[serde(default)]
    pub exceptions: ExceptionConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `crown_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Log file used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Number of daily log files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers in log lines.
    #[serde(default)]
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
            file_path: None,
            max_files: default_max_files(),
            thread_ids: false,
            file_location: false,
        }
    }
}

fn default_max_files() -> u32 {
    5
}

// =============================================================================
// Layout
// =============================================================================

/// Initial layout state of an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Whether markup responses are wrapped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Name of the layout to use.
    #[serde(default = "default_layout_name")]
    pub name: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            name: default_layout_name(),
        }
    }
}

fn default_layout_name() -> String {
    crown_framework::layout::DEFAULT_LAYOUT_NAME.to_string()
}

// =============================================================================
// Exceptions
// =============================================================================

/// Exception policy of an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionConfig {
    /// Convert failures into error pages instead of returning them.
    #[serde(default = "default_enabled")]
    pub trapping: bool,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self {
            trapping: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
