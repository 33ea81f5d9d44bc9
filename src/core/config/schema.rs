//! core::config::schema
//!
//! Configuration schema types.
//!
//! # User Config
//!
//! Located at (in order of precedence):
//! 1. `$BIOSHED_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/bioshed/config.toml`
//! 3. `<init_dir>/config.toml` (canonical write location)
//!
//! # Provider State
//!
//! `<init_dir>/<provider>_config_constants.json` is written by the
//! infrastructure provisioning tooling. bioshed only reads it.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Provider;

/// User configuration.
///
/// # Example
///
/// ```toml
/// provider = "aws"
/// container_runtime = "docker"
/// module_registry = "public.ecr.aws/myorg"
///
/// [batch]
/// job_queue = "bioshed-queue"
/// job_definition = "bioshed-jobdef"
///
/// [catalog]
/// modules = ["fastqc", "bwa"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Cloud provider (aws, amazon, gcp, google)
    pub provider: Option<String>,

    /// Container runtime binary (default: docker)
    pub container_runtime: Option<String>,

    /// Registry hosting bioshed modules
    pub module_registry: Option<String>,

    /// Batch job settings, overriding provider state
    pub batch: Option<BatchConfig>,

    /// Module listing settings
    pub catalog: Option<CatalogConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedProvider` for an unknown provider and
    /// `ConfigError::InvalidValue` for other bad values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            Provider::parse(provider)
                .map_err(|_| ConfigError::UnsupportedProvider(provider.clone()))?;
        }

        if let Some(runtime) = &self.container_runtime {
            if runtime.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "container_runtime cannot be empty".to_string(),
                ));
            }
        }

        if let Some(batch) = &self.batch {
            batch.validate()?;
        }

        Ok(())
    }
}

/// Batch job settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub job_queue: Option<String>,
    pub job_definition: Option<String>,
}

impl BatchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("batch.job_queue", &self.job_queue),
            ("batch.job_definition", &self.job_definition),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!("{} cannot be empty", key)));
            }
        }
        Ok(())
    }
}

/// Module listing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Modules offered by `run --list`
    pub modules: Option<Vec<String>>,
}

/// Provider state written by infrastructure provisioning.
///
/// Unknown keys are tolerated since provisioning owns this file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderState {
    /// Logged-in user
    pub login: Option<String>,

    /// Region the core infrastructure lives in
    pub region: Option<String>,

    /// Batch queue created by `deploy core`
    pub job_queue: Option<String>,

    /// Batch job definition created by `deploy core`
    pub job_definition: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_parses() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
            provider = "amazon"
            container_runtime = "podman"

            [batch]
            job_queue = "q"
            job_definition = "d"

            [catalog]
            modules = ["fastqc"]
        "#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(config.provider.as_deref(), Some("amazon"));
        assert_eq!(config.batch.as_ref().unwrap().job_queue.as_deref(), Some("q"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("bogus = 1");
        assert!(result.is_err());
    }

    #[test]
    fn unsupported_provider_rejected() {
        let config = ConfigFile {
            provider: Some("azure".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedProvider(p)) if p == "azure"
        ));
    }

    #[test]
    fn empty_job_queue_rejected() {
        let config = ConfigFile {
            batch: Some(BatchConfig {
                job_queue: Some(" ".into()),
                job_definition: None,
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn provider_state_tolerates_extra_keys() {
        let state: ProviderState =
            serde_json::from_str(r#"{"login": "ada", "job_queue": "q", "vpc": "x"}"#).unwrap();
        assert_eq!(state.login.as_deref(), Some("ada"));
        assert_eq!(state.job_queue.as_deref(), Some("q"));
        assert!(state.job_definition.is_none());
    }
}
