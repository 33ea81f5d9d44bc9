//! engine::module
//!
//! Module name normalization and per-module policy.
//!
//! - `biocontainers <name>[:<tag>] args...` runs an image from the public
//!   biocontainers registry and is always a local run.
//! - Example runs replace the module arguments with a print of the bundled
//!   example file.
//! - Modules listed in [`MODULE_RULES`] get implicit arguments prepended
//!   ahead of the user's arguments.

use crate::core::types::{normalize_module_name, ModuleReference, DEFAULT_TAG};

use super::UsageError;

/// Public registry hosting biocontainers images.
pub const BIOCONTAINERS_REGISTRY: &str = "public.ecr.aws/biocontainers";

/// Arguments an example run passes to the module image.
pub const EXAMPLE_ARGS: &[&str] = &["cat", "/example.txt"];

/// Implicit arguments for a module whose own CLI needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRule {
    pub module: &'static str,
    /// Flag that selects the output directory.
    pub output_flag: &'static str,
    /// Container-side output directory.
    pub output_dir: &'static str,
}

/// Modules with no sensible default output location.
pub const MODULE_RULES: &[ModuleRule] = &[ModuleRule {
    module: "fastqc",
    output_flag: "-o",
    output_dir: "/output/",
}];

/// Look up the rule for a module.
pub fn rule_for(module: &str) -> Option<&'static ModuleRule> {
    MODULE_RULES.iter().find(|r| r.module == module)
}

/// A module with its passthrough arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub module: ModuleReference,
    pub args: Vec<String>,
    /// The module can only run as a local container.
    pub forced_local: bool,
}

/// Outcome of module resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResolution {
    Resolved(ResolvedModule),
    /// `biocontainers` without an image: show biocontainers help.
    BiocontainersHelp,
}

/// Resolve the module candidate and its arguments.
///
/// `rest` is the module token followed by its arguments. `help_requested`
/// reports whether the original invocation contained `--help`.
///
/// # Errors
///
/// `UsageError::MissingModule` if `rest` is empty or names an empty module.
pub fn resolve_module(
    rest: &[String],
    example: bool,
    help_requested: bool,
) -> Result<ModuleResolution, UsageError> {
    let (first, args) = rest.split_first().ok_or(UsageError::MissingModule)?;
    let name = normalize_module_name(first);
    if name.is_empty() {
        return Err(UsageError::MissingModule);
    }

    if ModuleReference::new(&name).is_biocontainers() {
        return resolve_biocontainers(args, help_requested);
    }

    let args = if example {
        EXAMPLE_ARGS.iter().map(|a| a.to_string()).collect()
    } else {
        with_implicit_args(&name, args)
    };

    Ok(ModuleResolution::Resolved(ResolvedModule {
        module: ModuleReference::new(&name),
        args,
        forced_local: false,
    }))
}

fn resolve_biocontainers(
    args: &[String],
    help_requested: bool,
) -> Result<ModuleResolution, UsageError> {
    let Some((image, rest)) = args.split_first() else {
        return Ok(ModuleResolution::BiocontainersHelp);
    };
    // `biocontainers <image> --help` asks about biocontainers itself.
    let image_help = image == "--help" || (rest.len() == 1 && help_requested);
    if image_help {
        return Ok(ModuleResolution::BiocontainersHelp);
    }

    let mut parts = image.split(':');
    let name = normalize_module_name(parts.next().unwrap_or_default());
    if name.is_empty() {
        return Err(UsageError::MissingModule);
    }
    let tag = parts
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TAG);

    Ok(ModuleResolution::Resolved(ResolvedModule {
        module: ModuleReference::new(&name)
            .with_registry(BIOCONTAINERS_REGISTRY)
            .with_tag(tag),
        args: rest.to_vec(),
        forced_local: true,
    }))
}

/// Prepend a module's implicit output arguments unless the user already
/// chose an output directory.
fn with_implicit_args(module: &str, args: &[String]) -> Vec<String> {
    match rule_for(module) {
        Some(rule) if !args.iter().any(|a| a == rule.output_flag) => {
            let mut out = vec![rule.output_flag.to_string(), rule.output_dir.to_string()];
            out.extend_from_slice(args);
            out
        }
        _ => args.to_vec(),
    }
}
