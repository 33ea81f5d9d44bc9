//! collab::traits
//!
//! Interfaces to the collaborators the resolution engine depends on.
//!
//! # Design
//!
//! The engine only *plans*. Everything that touches credentials, registries,
//! container daemons, or cloud services sits behind one of these traits:
//!
//! - [`CloudState`] - Is a provider authenticated and provisioned?
//! - [`EnvFileResolver`] - Which env file carries a provider's credentials?
//! - [`ModuleCatalog`] - Which modules can be run?
//! - [`BatchSubmitter`] / [`ContainerRunner`] - The two terminal sinks
//!
//! All calls are synchronous. Implementations never retry; that policy, if
//! any, belongs to the caller of the CLI.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Settings;
use crate::core::types::{ExecutionDescriptor, Provider};

/// Errors from collaborator operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollabError {
    /// The provider is known but this operation does not support it.
    #[error("cloud provider '{0}' is not supported for this operation")]
    UnsupportedProvider(String),

    /// Required state (queue, definition, env file) is not available.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// An external tool could not be started.
    #[error("failed to launch '{program}': {message}")]
    Launch { program: String, message: String },

    /// An external tool ran but reported failure.
    #[error("'{program}' exited with status {status}: {message}")]
    Failed {
        program: String,
        status: i32,
        message: String,
    },

    /// Output from an external tool could not be understood.
    #[error("unexpected output from '{program}': {message}")]
    BadOutput { program: String, message: String },
}

/// Information about a submitted batch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub job_id: String,
    pub job_name: String,
}

/// Cloud credential and infrastructure state.
pub trait CloudState {
    /// Whether a cloud provider is authenticated.
    fn is_credential_configured(&self) -> bool;

    /// Whether the provider's core infrastructure is deployed.
    fn is_core_infrastructure_deployed(&self, settings: &Settings) -> bool;
}

/// Resolution of a provider's default credential env file.
pub trait EnvFileResolver {
    fn resolve_default_env_file(
        &self,
        provider: Provider,
        init_dir: &Path,
    ) -> Result<PathBuf, CollabError>;
}

/// Listing of runnable modules.
pub trait ModuleCatalog {
    fn list_available_modules(&self) -> Result<BTreeSet<String>, CollabError>;
}

/// Sink for cloud batch descriptors.
pub trait BatchSubmitter {
    fn submit(&self, descriptor: &ExecutionDescriptor) -> Result<JobInfo, CollabError>;
}

/// Sink for local container descriptors.
pub trait ContainerRunner {
    fn run(&self, descriptor: &ExecutionDescriptor) -> Result<(), CollabError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CollabError::UnsupportedProvider("gcp".into());
        assert!(err.to_string().contains("gcp"));

        let err = CollabError::Failed {
            program: "docker".into(),
            status: 125,
            message: "no such image".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docker"));
        assert!(msg.contains("125"));
        assert!(msg.contains("no such image"));
    }
}
