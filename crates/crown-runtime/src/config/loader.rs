//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`crown.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`crown.yaml`, `crown.yml`, etc.)
//!
//! Both features can be enabled simultaneously; if so, both file formats are searched and loaded.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic base configuration ([`ConfigLoader::merge`])
//! 3. Profile-specific config file (`crown.{profile}.toml` / `crown.{profile}.yaml`)
//! 4. Main config file (`crown.toml` / `crown.yaml`)
//! 5. Environment variables (`CROWN_*`)
//! 6. Keyed overrides ([`ConfigLoader::set`])
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `CROWN_` prefix with `__` as separator:
//!
//! - `CROWN_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `CROWN_LAYOUT__NAME=site` → `layout.name = "site"`
//! - `CROWN_EXCEPTIONS__TRAPPING=false` → `exceptions.trapping = false`
//!
//! # Example
//!
//! ```rust,ignore
//! use crown_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/crown.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::CrownConfig;
use super::validation::validate_config;

/// Environment variable selecting the profile.
pub const PROFILE_ENV: &str = "CROWN_PROFILE";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `prod` and `dev` are accepted as aliases.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `CROWN_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic base configuration, merged right after the defaults.
    figment: Figment,
    /// Keyed overrides, merged last.
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds user config directory to search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("crown"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a complete configuration programmatically.
    ///
    /// The configuration replaces the built-in defaults; config files and
    /// environment variables still take precedence over it. Use
    /// [`set`](Self::set) for values that must win over every source.
    pub fn merge(mut self, config: CrownConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Overrides a single value by its dotted key, e.g. `"layout.name"`.
    ///
    /// Keyed overrides take precedence over every other source and leave
    /// all other keys untouched.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<CrownConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: CrownConfig = figment.extract()?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            layout = %config.layout.name,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(CrownConfig::default()));

        let base = std::mem::take(&mut self.figment);
        figment = figment.merge(base);

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            figment = self.merge_profile_variant(figment, &path);
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, &path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with CROWN_ prefix");
            figment = figment.merge(Env::prefixed("CROWN_").ignore(&["PROFILE"]).split("__"));
        }

        let overrides = std::mem::take(&mut self.overrides);
        Ok(figment.merge(overrides))
    }

    /// Merges `stem.{profile}.ext` next to an explicitly given file, if present.
    fn merge_profile_variant(&self, figment: Figment, path: &Path) -> Figment {
        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            return figment;
        };
        let variant = path.with_file_name(format!("{stem}.{}.{ext}", self.profile.as_str()));
        if !variant.exists() {
            return figment;
        }
        debug!(path = %variant.display(), "Loading profile-specific config");
        Self::merge_config_file(figment.clone(), &variant).unwrap_or(figment)
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("crown"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Common search logic for a single file format.
    ///
    /// Iterates `search_paths × base_names`, tries a profile-specific variant first, then the
    /// base file. Returns `(figment, true)` as soon as a base file is found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                if let Some((stem, ext)) = base_name.rsplit_once('.') {
                    // e.g. crown.production.toml
                    let profile_name = format!("{stem}.{}.{ext}", self.profile.as_str());
                    let profile_path = search_path.join(&profile_name);
                    if profile_path.exists() {
                        debug!(path = %profile_path.display(), "Loading profile-specific config");
                        figment = merge_fn(figment, &profile_path);
                    }

                    let base_path = search_path.join(base_name);
                    if base_path.exists() {
                        info!(path = %base_path.display(), "Loading configuration file");
                        figment = merge_fn(figment, &base_path);
                        return (figment, true);
                    }
                }
            }
        }
        (figment, false)
    }

    /// Searches for and loads configuration files from search paths.
    #[allow(unused_mut)]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["crown.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["crown.yaml", "crown.yml", "config.yaml", "config.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!(
                paths = search_paths.len(),
                "No configuration file found, using defaults"
            );
        }
        figment
    }
}

/// Loads configuration from the current directory and the user config directory.
pub fn load_config() -> ConfigResult<CrownConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<CrownConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
