//! engine
//!
//! Resolves a raw `run` / `runlocal` invocation into an execution descriptor.
//!
//! # Pipeline
//!
//! ```text
//! normalize -> scan flags -> target -> rescan -> module -> mounts -> descriptor
//! ```
//!
//! 1. [`normalize`] applies the ordered rewrite rules (`--example`, trailing
//!    `--help`, `--list`).
//! 2. [`options::scan_flags`] reads the dispatcher flags in front of the
//!    module. A missing module is reported here, before any collaborator is
//!    consulted.
//! 3. [`target`] asks the cloud state collaborator whether a batch run is
//!    possible and inserts `--local` when it is not.
//! 4. [`module`] applies per-module policy.
//! 5. [`mounts`] plans volumes and the env file for local runs.
//! 6. [`descriptor`] assembles the result.
//!
//! The engine performs no side effects beyond collaborator queries. The
//! descriptor is handed to exactly one sink by [`dispatch`].
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use bioshed::collab::mock::{MockCatalog, MockCloudState, MockEnvFiles};
//! use bioshed::core::config::{ConfigFile, Settings};
//! use bioshed::core::paths::BioshedPaths;
//! use bioshed::core::types::{ExecutionMode, RawInvocation};
//! use bioshed::engine::{resolve, Collaborators, Outcome};
//!
//! let settings = Settings::new(BioshedPaths::new("/init".into()), ConfigFile::default());
//! let cloud = MockCloudState::unconfigured();
//! let env_files = MockEnvFiles::default();
//! let catalog = MockCatalog::default();
//! let collab = Collaborators { cloud: &cloud, env_files: &env_files, catalog: &catalog };
//!
//! let raw = RawInvocation::new(["run", "fastqc", "-h"]);
//! match resolve(&raw, Path::new("/work"), &settings, &collab).unwrap() {
//!     Outcome::Descriptor(r) => assert_eq!(r.descriptor.mode, ExecutionMode::LocalContainer),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod descriptor;
pub mod dispatch;
pub mod module;
pub mod mounts;
pub mod normalize;
pub mod options;
pub mod target;

pub use descriptor::DescriptorBuilder;
pub use dispatch::{dispatch, DispatchError, Dispatched, Sinks, FAILURE_EXIT};
pub use normalize::{normalize, Normalized};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::collab::{CloudState, CollabError, EnvFileResolver, ModuleCatalog};
use crate::core::config::Settings;
use crate::core::types::{ExecutionDescriptor, ExecutionMode, Provider, RawInvocation};

use module::ModuleResolution;
use mounts::MountRequest;
use normalize::HELP_FLAG;

/// Module that exists for internal smoke testing and is never listed.
pub const HIDDEN_MODULE: &str = "test";

/// Sub-commands the engine resolves.
pub const RUN_SUBCOMMANDS: &[&str] = &["run", "runlocal"];

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Print the descriptor instead of dispatching it.
    pub dry_run: bool,
}

impl Context {
    /// Working directory for this invocation, read once.
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// Malformed invocations. Always raised before any collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("no sub-command given")]
    TooFewTokens,

    #[error("unknown sub-command '{0}' (expected run or runlocal)")]
    UnknownSubcommand(String),

    #[error("no module specified")]
    MissingModule,

    #[error("unknown option '{0}'")]
    UnknownFlag(String),

    #[error("option '{flag}' requires a value")]
    MissingValue { flag: &'static str },
}

/// Non-fatal problems recorded on a resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveWarning {
    #[error("--aws-env-file given without a path; ignoring")]
    MissingEnvFile,

    #[error("no default env file for {provider}: {reason}")]
    DefaultEnvFileUnavailable { provider: Provider, reason: String },
}

/// Errors from [`resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("failed to list modules: {0}")]
    Catalog(CollabError),
}

/// Which help text to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Run,
    Biocontainers,
}

/// A descriptor with the warnings collected while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub descriptor: ExecutionDescriptor,
    pub warnings: Vec<ResolveWarning>,
}

/// Result of resolving an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Descriptor(Resolution),
    Help(HelpTopic),
    /// Runnable modules, sorted, internal modules removed.
    Listing(BTreeSet<String>),
}

impl Outcome {
    /// Process exit code for this outcome when nothing fails afterwards.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Descriptor(_) => 0,
            Outcome::Help(_) | Outcome::Listing(_) => 1,
        }
    }
}

/// Collaborators consulted during resolution.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub cloud: &'a dyn CloudState,
    pub env_files: &'a dyn EnvFileResolver,
    pub catalog: &'a dyn ModuleCatalog,
}

/// Resolve one invocation.
///
/// `work_dir` is the working directory snapshot for this invocation.
///
/// # Errors
///
/// - `ResolveError::Usage` for malformed invocations
/// - `ResolveError::Catalog` if the module listing fails
pub fn resolve(
    raw: &RawInvocation,
    work_dir: &Path,
    settings: &Settings,
    collab: &Collaborators<'_>,
) -> Result<Outcome, ResolveError> {
    let subcommand = raw.subcommand().ok_or(UsageError::TooFewTokens)?;
    if !RUN_SUBCOMMANDS.contains(&subcommand) {
        return Err(UsageError::UnknownSubcommand(subcommand.to_string()).into());
    }

    let normalized = match normalize(raw) {
        Normalized::List => return list_modules(collab.catalog),
        Normalized::Tokens(n) => n,
    };

    let scanned = options::scan_flags(&normalized.tokens[1..])?;
    if scanned.wants_help() {
        return Ok(Outcome::Help(HelpTopic::Run));
    }
    if scanned.module_token().is_none() {
        return Err(UsageError::MissingModule.into());
    }

    let decision = target::resolve_target(normalized.tokens, &scanned, settings, collab.cloud);
    let scanned = options::scan_flags(&decision.tokens[1..])?;
    for warning in &scanned.warnings {
        tracing::warn!("{}", warning);
    }

    let help_requested = raw.tokens().iter().any(|t| t == HELP_FLAG);
    let resolved = match module::resolve_module(&scanned.rest, normalized.example, help_requested)? {
        ModuleResolution::Resolved(r) => r,
        ModuleResolution::BiocontainersHelp => return Ok(Outcome::Help(HelpTopic::Biocontainers)),
    };

    let mode = if scanned.forces_local() || resolved.forced_local {
        ExecutionMode::LocalContainer
    } else {
        ExecutionMode::CloudBatch
    };
    tracing::debug!(
        %mode,
        module = %resolved.module.name,
        downgraded = decision.downgraded,
        "execution target resolved"
    );

    let plan = mounts::plan(
        &MountRequest {
            mode,
            biocontainers: resolved.forced_local,
            args: &resolved.args,
            work_dir,
            input_dir: scanned.input_dir(),
            env_file: scanned.env_file(),
            env_flag_given: scanned.env_file_flag_given(),
            init_dir: settings.paths.init_dir(),
        },
        collab.env_files,
    );

    let mut warnings = scanned.warnings.clone();
    warnings.extend(plan.warnings);

    let descriptor = DescriptorBuilder::new(mode)
        .module(resolved.module)
        .args(resolved.args)
        .mounts(plan.mounts)
        .env(plan.env)
        .sudo_user(scanned.sudo_user().map(str::to_string))
        .build()?;

    Ok(Outcome::Descriptor(Resolution {
        descriptor,
        warnings,
    }))
}

fn list_modules(catalog: &dyn ModuleCatalog) -> Result<Outcome, ResolveError> {
    let mut modules = catalog
        .list_available_modules()
        .map_err(ResolveError::Catalog)?;
    modules.remove(HIDDEN_MODULE);
    Ok(Outcome::Listing(modules))
}
