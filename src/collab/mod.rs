//! collab
//!
//! Collaborators the resolution engine consults and the sinks it feeds.
//!
//! # Modules
//!
//! - `traits`: collaborator traits and [`CollabError`]
//! - [`init_dir`]: cloud state and env files read from the init directory
//! - [`catalog`]: module listing
//! - [`docker`]: local container sink
//! - [`aws_batch`]: cloud batch sink
//! - [`mock`]: recording implementations for deterministic testing
//!
//! Commands use the `create_*` functions rather than naming implementations
//! directly.

pub mod aws_batch;
pub mod catalog;
pub mod docker;
pub mod init_dir;
pub mod mock;
mod traits;

pub use traits::*;

use crate::core::config::{ConfigError, Settings};

use aws_batch::AwsBatchSubmitter;
use catalog::StaticCatalog;
use docker::DockerRunner;
use init_dir::InitDirState;

/// Cloud state and env file resolution for the configured provider.
///
/// # Errors
///
/// `ConfigError::UnsupportedProvider` if the configured provider is unknown.
pub fn create_cloud_state(settings: &Settings) -> Result<InitDirState, ConfigError> {
    Ok(InitDirState::new(settings.paths.clone(), settings.provider()?))
}

pub fn create_catalog(settings: &Settings) -> StaticCatalog {
    StaticCatalog::from_settings(settings)
}

pub fn create_container_runner(settings: &Settings) -> DockerRunner {
    DockerRunner::from_settings(settings)
}

/// # Errors
///
/// Fails if the configured provider is unknown.
pub fn create_batch_submitter(settings: &Settings) -> Result<AwsBatchSubmitter, ConfigError> {
    AwsBatchSubmitter::from_settings(settings)
}
