//! core::paths
//!
//! Centralized path routing for bioshed storage locations.
//!
//! All per-user state lives under the init directory:
//! - `config.toml` - User configuration
//! - `aws_config_constants.json` - AWS provider state written by provisioning
//! - `gcp_config_constants.json` - GCP provider state
//! - `aws.env` / `gcp.env` - Default credential env files
//!
//! **Hard rule:** no code outside this module joins file names onto the init
//! directory. Paths are passed around as a [`BioshedPaths`] value, never read
//! from process-wide state.
//!
//! # Example
//!
//! ```
//! use bioshed::core::paths::BioshedPaths;
//! use bioshed::core::types::Provider;
//! use std::path::PathBuf;
//!
//! let paths = BioshedPaths::new(PathBuf::from("/home/me/.bioshedinit"));
//! assert_eq!(
//!     paths.provider_state_path(Provider::Aws),
//!     PathBuf::from("/home/me/.bioshedinit/aws_config_constants.json")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::types::Provider;

/// Environment variable overriding the init directory.
pub const INIT_DIR_ENV: &str = "BIOSHED_INIT_DIR";

/// Init directory name under the home directory.
const INIT_DIR_NAME: &str = ".bioshedinit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BioshedPaths {
    pub init_dir: PathBuf,
}

impl BioshedPaths {
    pub fn new(init_dir: PathBuf) -> Self {
        Self { init_dir }
    }

    /// Locate the init directory for the current user.
    ///
    /// `$BIOSHED_INIT_DIR` wins; otherwise `~/.bioshedinit`. Returns `None`
    /// only when no home directory can be determined.
    pub fn discover() -> Option<Self> {
        if let Ok(dir) = std::env::var(INIT_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Some(Self::new(PathBuf::from(dir)));
            }
        }
        dirs::home_dir().map(|home| Self::new(home.join(INIT_DIR_NAME)))
    }

    pub fn init_dir(&self) -> &Path {
        &self.init_dir
    }

    /// `<init_dir>/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.init_dir.join("config.toml")
    }

    /// Provider state JSON written by infrastructure provisioning.
    pub fn provider_state_path(&self, provider: Provider) -> PathBuf {
        self.init_dir
            .join(format!("{}_config_constants.json", provider.name()))
    }

    /// Default env file carrying the provider's credentials.
    pub fn default_env_file(&self, provider: Provider) -> PathBuf {
        self.init_dir.join(format!("{}.env", provider.name()))
    }
}
