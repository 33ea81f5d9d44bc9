//! core::types
//!
//! Strong types for the dispatch domain.
//!
//! # Types
//!
//! - [`RawInvocation`] - Tokens typed after the program name
//! - [`ExecutionMode`] - Cloud batch job or local container
//! - [`ModuleReference`] - Normalized module name, registry, and tag
//! - [`MountBinding`] - Host path to container path binding
//! - [`Provider`] - Supported cloud providers
//! - [`ExecutionDescriptor`] - The final, immutable execution plan
//!
//! # Examples
//!
//! ```
//! use bioshed::core::types::{ModuleReference, Provider};
//!
//! let module = ModuleReference::new("  FastQC ");
//! assert_eq!(module.name, "fastqc");
//! assert_eq!(module.tag, "latest");
//!
//! assert_eq!(Provider::parse("amazon").unwrap(), Provider::Aws);
//! assert!(Provider::parse("azure").is_err());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag used when no `name:tag` was given.
pub const DEFAULT_TAG: &str = "latest";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("cloud provider '{0}' is not supported (expected one of: aws, amazon, gcp, google)")]
    UnsupportedProvider(String),
}

/// Ordered tokens typed after the program name.
///
/// The first token is the sub-command (`run` or `runlocal`). A raw
/// invocation is never mutated; rewrite stages produce new token vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInvocation {
    tokens: Vec<String>,
}

impl RawInvocation {
    /// Capture a token sequence.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// The captured tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The sub-command token, if any.
    pub fn subcommand(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Whether any token mentions the biocontainers pseudo-module.
    ///
    /// Matches on substrings, case-insensitively, so `biocontainers` inside a
    /// longer token still counts.
    pub fn references_biocontainers(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| t.to_ascii_lowercase().contains(BIOCONTAINERS))
    }
}

/// Name of the biocontainers pseudo-module.
pub const BIOCONTAINERS: &str = "biocontainers";

/// Where a module runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Submitted to a managed batch-compute service.
    CloudBatch,
    /// Run as a container on this machine.
    LocalContainer,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::CloudBatch => write!(f, "cloud batch"),
            ExecutionMode::LocalContainer => write!(f, "local container"),
        }
    }
}

/// A resolved module image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    /// Lowercase, trimmed module name.
    pub name: String,
    /// Registry hosting the image, if not the default one.
    pub registry: Option<String>,
    /// Image tag.
    pub tag: String,
}

impl ModuleReference {
    /// Create a reference with the default tag and no registry.
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_module_name(name),
            registry: None,
            tag: DEFAULT_TAG.to_string(),
        }
    }

    /// Set the registry.
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Whether this is the biocontainers pseudo-module itself.
    pub fn is_biocontainers(&self) -> bool {
        self.name == BIOCONTAINERS
    }

    /// Full image name, e.g. `public.ecr.aws/biocontainers/samtools:1.9`.
    ///
    /// `default_registry` is used when the reference carries none.
    pub fn image(&self, default_registry: Option<&str>) -> String {
        match self.registry.as_deref().or(default_registry) {
            Some(registry) => format!(
                "{}/{}:{}",
                registry.trim_end_matches('/'),
                self.name,
                self.tag
            ),
            None => format!("{}:{}", self.name, self.tag),
        }
    }
}

/// Trim and lowercase a module name.
pub fn normalize_module_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Extra volume options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountMode {
    /// Relabel the host content for container security (`:Z`).
    Relabel,
}

impl MountMode {
    /// Volume option suffix, without the leading colon.
    pub fn suffix(&self) -> &'static str {
        match self {
            MountMode::Relabel => "Z",
        }
    }
}

/// A host path made visible inside the container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MountBinding {
    pub host_path: PathBuf,
    pub container_path: String,
    pub mode: Option<MountMode>,
}

impl MountBinding {
    pub fn new(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: MountMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Render as a `-v` volume specification.
    pub fn volume_spec(&self) -> String {
        let mut spec = format!("{}:{}", self.host_path.display(), self.container_path);
        if let Some(mode) = self.mode {
            spec.push(':');
            spec.push_str(mode.suffix());
        }
        spec
    }
}

/// A file supplying environment variables to the execution environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSource {
    pub path: PathBuf,
}

impl EnvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Gcp,
}

impl Provider {
    /// Names accepted by [`Provider::parse`].
    pub const VALID_NAMES: &'static [&'static str] = &["aws", "amazon", "gcp", "google"];

    /// Parse a provider name or alias, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::UnsupportedProvider` for unknown names.
    pub fn parse(name: &str) -> Result<Self, TypeError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "aws" | "amazon" => Ok(Provider::Aws),
            "gcp" | "google" => Ok(Provider::Gcp),
            _ => Err(TypeError::UnsupportedProvider(name.to_string())),
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcp",
        }
    }

    /// URI scheme of the provider's object storage.
    pub fn storage_scheme(&self) -> &'static str {
        match self {
            Provider::Aws => "s3://",
            Provider::Gcp => "gcp://",
        }
    }

    /// Provider whose storage a token points at, if any.
    pub fn for_storage_uri(token: &str) -> Option<Self> {
        [Provider::Aws, Provider::Gcp]
            .into_iter()
            .find(|p| token.contains(p.storage_scheme()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The resolved, immutable plan handed to exactly one sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDescriptor {
    pub mode: ExecutionMode,
    pub module: ModuleReference,
    /// Exactly what the wrapped program receives, in order.
    pub args: Vec<String>,
    pub mounts: BTreeSet<MountBinding>,
    pub env: Option<EnvSource>,
    pub sudo_user: Option<String>,
}

impl ExecutionDescriptor {
    /// Whether any passthrough argument points at remote object storage.
    pub fn references_remote_storage(&self) -> bool {
        self.args
            .iter()
            .any(|a| Provider::for_storage_uri(a).is_some())
    }
}
