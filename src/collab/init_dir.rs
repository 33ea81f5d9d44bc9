//! collab::init_dir
//!
//! Cloud state read from the init directory.
//!
//! Authentication and provisioning are performed by external tooling that
//! leaves files behind in the init directory:
//!
//! - `<provider>.env` - credentials; its presence means the provider is
//!   authenticated
//! - `<provider>_config_constants.json` - provisioning output carrying the
//!   batch queue and job definition
//!
//! Nothing here writes to the init directory.

use std::path::{Path, PathBuf};

use super::traits::{CloudState, CollabError, EnvFileResolver};
use crate::core::config::Settings;
use crate::core::paths::BioshedPaths;
use crate::core::types::Provider;

/// [`CloudState`] and [`EnvFileResolver`] backed by the init directory.
#[derive(Debug, Clone)]
pub struct InitDirState {
    paths: BioshedPaths,
    provider: Provider,
}

impl InitDirState {
    pub fn new(paths: BioshedPaths, provider: Provider) -> Self {
        Self { paths, provider }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

impl CloudState for InitDirState {
    fn is_credential_configured(&self) -> bool {
        let env_file = self.paths.default_env_file(self.provider);
        let configured = env_file.is_file();
        tracing::debug!(
            provider = %self.provider,
            path = %env_file.display(),
            configured,
            "credential check"
        );
        configured
    }

    fn is_core_infrastructure_deployed(&self, settings: &Settings) -> bool {
        let state = match settings.provider_state(self.provider) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(provider = %self.provider, error = %e, "unreadable provider state");
                return false;
            }
        };
        let deployed =
            settings.job_queue(&state).is_some() && settings.job_definition(&state).is_some();
        tracing::debug!(provider = %self.provider, deployed, "infrastructure check");
        deployed
    }
}

impl EnvFileResolver for InitDirState {
    fn resolve_default_env_file(
        &self,
        provider: Provider,
        init_dir: &Path,
    ) -> Result<PathBuf, CollabError> {
        let path = BioshedPaths::new(init_dir.to_path_buf()).default_env_file(provider);
        if path.is_file() {
            Ok(path)
        } else {
            Err(CollabError::NotConfigured(format!(
                "{} credentials not found at {}",
                provider,
                path.display()
            )))
        }
    }
}
