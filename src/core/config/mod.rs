//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! bioshed reads one user configuration file plus the provider state files
//! written by provisioning. Everything is gathered into a [`Settings`] value
//! that is threaded explicitly through the resolution pipeline.
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$BIOSHED_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/bioshed/config.toml`
//! 3. `<init_dir>/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use bioshed::core::config::Settings;
//! use bioshed::core::paths::BioshedPaths;
//!
//! let paths = BioshedPaths::discover().expect("home directory");
//! let settings = Settings::load(paths).unwrap();
//!
//! println!("Provider: {}", settings.provider().unwrap());
//! println!("Runtime: {}", settings.container_runtime());
//! ```

pub mod schema;

pub use schema::{BatchConfig, CatalogConfig, ConfigFile, ProviderState};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::BioshedPaths;
use crate::core::types::Provider;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "BIOSHED_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("cloud provider '{0}' is not supported (expected one of: aws, amazon, gcp, google)")]
    UnsupportedProvider(String),
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Storage locations
    pub paths: BioshedPaths,
    /// Parsed user configuration
    pub file: ConfigFile,
    /// Path the configuration was loaded from (if any)
    source: Option<PathBuf>,
}

impl Settings {
    /// Keys understood by [`Settings::get`] and [`Settings::set`].
    pub const KEYS: &'static [&'static str] = &[
        "provider",
        "container_runtime",
        "module_registry",
        "batch.job_queue",
        "batch.job_definition",
    ];

    /// Build settings from already-parsed parts.
    pub fn new(paths: BioshedPaths, file: ConfigFile) -> Self {
        Self {
            paths,
            file,
            source: None,
        }
    }

    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed, or
    /// validated. A missing config file is not an error (defaults are used).
    pub fn load(paths: BioshedPaths) -> Result<Self, ConfigError> {
        let source = Self::locate(&paths);
        let file = match &source {
            Some(path) => Self::read_config(path)?,
            None => ConfigFile::default(),
        };
        file.validate()?;

        tracing::debug!(source = ?source, "loaded configuration");

        Ok(Self {
            paths,
            file,
            source,
        })
    }

    /// Find the first existing config file.
    fn locate(paths: &BioshedPaths) -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("bioshed/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = paths.config_path();
        path.exists().then_some(path)
    }

    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path the configuration was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Where [`Settings::save`] writes.
    ///
    /// The loaded file if there was one, otherwise `<init_dir>/config.toml`.
    pub fn write_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| self.paths.config_path())
    }

    /// Validate and write the configuration atomically.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        self.file.validate()?;
        let path = self.write_path();
        write_config_atomic(&path, &self.file)?;
        Ok(path)
    }

    // =========================================================================
    // Accessors with defaults
    // =========================================================================

    /// Configured cloud provider.
    ///
    /// Defaults to AWS if not configured.
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        match &self.file.provider {
            Some(name) => {
                Provider::parse(name).map_err(|_| ConfigError::UnsupportedProvider(name.clone()))
            }
            None => Ok(Provider::Aws),
        }
    }

    /// Container runtime binary.
    ///
    /// Defaults to "docker" if not configured.
    pub fn container_runtime(&self) -> &str {
        self.file.container_runtime.as_deref().unwrap_or("docker")
    }

    /// Registry hosting bioshed modules, if any.
    pub fn module_registry(&self) -> Option<&str> {
        self.file.module_registry.as_deref()
    }

    /// Modules configured for listing, if any.
    pub fn catalog_modules(&self) -> Option<&[String]> {
        self.file
            .catalog
            .as_ref()
            .and_then(|c| c.modules.as_deref())
    }

    /// Read the provider state written by provisioning.
    ///
    /// A missing file yields the default (empty) state.
    pub fn provider_state(&self, provider: Provider) -> Result<ProviderState, ConfigError> {
        let path = self.paths.provider_state_path(provider);
        if !path.exists() {
            return Ok(ProviderState::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        // An empty file is what `init` leaves behind before provisioning runs.
        if contents.trim().is_empty() {
            return Ok(ProviderState::default());
        }

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Batch queue: config override first, then provider state.
    pub fn job_queue<'a>(&'a self, state: &'a ProviderState) -> Option<&'a str> {
        self.file
            .batch
            .as_ref()
            .and_then(|b| b.job_queue.as_deref())
            .or(state.job_queue.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Batch job definition: config override first, then provider state.
    pub fn job_definition<'a>(&'a self, state: &'a ProviderState) -> Option<&'a str> {
        self.file
            .batch
            .as_ref()
            .and_then(|b| b.job_definition.as_deref())
            .or(state.job_definition.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    // =========================================================================
    // Key access for `bioshed config`
    // =========================================================================

    /// Look up a configuration value by dotted key.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let batch = self.file.batch.as_ref();
        let value = match key {
            "provider" => self.file.provider.clone(),
            "container_runtime" => self.file.container_runtime.clone(),
            "module_registry" => self.file.module_registry.clone(),
            "batch.job_queue" => batch.and_then(|b| b.job_queue.clone()),
            "batch.job_definition" => batch.and_then(|b| b.job_definition.clone()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set a configuration value by dotted key, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = Some(value.to_string());
        match key {
            "provider" => self.file.provider = value,
            "container_runtime" => self.file.container_runtime = value,
            "module_registry" => self.file.module_registry = value,
            "batch.job_queue" => self.file.batch.get_or_insert_with(Default::default).job_queue = value,
            "batch.job_definition" => {
                self.file
                    .batch
                    .get_or_insert_with(Default::default)
                    .job_definition = value
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.file.validate()
    }
}

/// Write a config file atomically.
///
/// Creates parent directories if needed, writes a temp file next to the
/// target and renames it into place.
pub fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
