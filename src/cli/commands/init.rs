//! init command - Create the init directory and default configuration

use std::fs;

use crate::cli::commands::discover_paths;
use crate::core::config::{ConfigFile, Settings};
use crate::core::paths::BioshedPaths;
use crate::core::types::Provider;
use crate::engine::options::extract_options;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};
use anyhow::{bail, Context as _, Result};

/// Options understood by `init`.
const INIT_OPTIONS: &[&str] = &["provider", "force", "help"];

const INIT_HELP: &str = "\
Create the bioshed init directory and a default configuration.

USAGE:
    bioshed init [--provider <aws|gcp>] [--force]

OPTIONS:
    --provider <NAME>   Cloud provider: aws, amazon, gcp, google (default: aws)
    --force             Overwrite an existing configuration

The init directory is $BIOSHED_INIT_DIR or ~/.bioshedinit.";

/// Initialize bioshed for the current user.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `raw` - Options after `init`, verbatim
pub fn init(ctx: &Context, raw: &[String]) -> Result<i32> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let options = extract_options(raw);

    if let Some(unknown) = options.unknown(INIT_OPTIONS).first() {
        bail!("Unknown option for init: --{}", unknown);
    }
    if let Some(extra) = options.passthrough.first() {
        bail!("Unexpected argument for init: {}", extra);
    }
    if options.contains("help") {
        println!("{}", INIT_HELP);
        return Ok(1);
    }

    let provider = match options.get("provider") {
        Some(name) => Provider::parse(name)?,
        None => Provider::Aws,
    };
    let force = options.contains("force");

    let paths = discover_paths()?;
    let config_path = initialize(&paths, provider, force)?;

    output::print(
        format!("Initialized bioshed in {}", paths.init_dir().display()),
        verbosity,
    );
    match config_path {
        Some(path) => output::print(format!("Wrote {}", path.display()), verbosity),
        None => output::print(
            "Existing configuration kept; use --force to overwrite.",
            verbosity,
        ),
    }
    Ok(0)
}

/// Create the init layout. Returns the config path if it was written.
fn initialize(
    paths: &BioshedPaths,
    provider: Provider,
    force: bool,
) -> Result<Option<std::path::PathBuf>> {
    fs::create_dir_all(paths.init_dir()).with_context(|| {
        format!(
            "Failed to create init directory {}",
            paths.init_dir().display()
        )
    })?;

    // Provisioning fills this in later.
    let state_path = paths.provider_state_path(provider);
    if !state_path.exists() {
        fs::write(&state_path, "")
            .with_context(|| format!("Failed to create {}", state_path.display()))?;
    }

    if paths.config_path().exists() && !force {
        return Ok(None);
    }

    let settings = Settings::new(
        paths.clone(),
        ConfigFile {
            provider: Some(provider.name().to_string()),
            ..Default::default()
        },
    );
    let written = settings.save().context("Failed to write configuration")?;
    Ok(Some(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_layout() {
        let dir = TempDir::new().unwrap();
        let paths = BioshedPaths::new(dir.path().join("init"));

        let written = initialize(&paths, Provider::Gcp, false).unwrap();
        assert_eq!(written, Some(paths.config_path()));
        assert!(paths.provider_state_path(Provider::Gcp).exists());

        let contents = fs::read_to_string(paths.config_path()).unwrap();
        assert!(contents.contains("provider = \"gcp\""));
    }

    #[test]
    fn keeps_existing_config_without_force() {
        let dir = TempDir::new().unwrap();
        let paths = BioshedPaths::new(dir.path().to_path_buf());
        fs::write(paths.config_path(), "provider = \"aws\"\n").unwrap();

        assert_eq!(initialize(&paths, Provider::Gcp, false).unwrap(), None);
        let contents = fs::read_to_string(paths.config_path()).unwrap();
        assert!(contents.contains("aws"));

        assert!(initialize(&paths, Provider::Gcp, true).unwrap().is_some());
        let contents = fs::read_to_string(paths.config_path()).unwrap();
        assert!(contents.contains("gcp"));
    }

    #[test]
    fn provider_state_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let paths = BioshedPaths::new(dir.path().to_path_buf());
        let state = paths.provider_state_path(Provider::Aws);
        fs::write(&state, r#"{"job_queue": "q"}"#).unwrap();

        initialize(&paths, Provider::Aws, true).unwrap();
        assert_eq!(fs::read_to_string(state).unwrap(), r#"{"job_queue": "q"}"#);
    }

    #[test]
    fn rejects_unknown_options() {
        let err = init(&Context::default(), &["--bogus".to_string()]).unwrap_err();
        assert!(err.to_string().contains("--bogus"));
    }

    #[test]
    fn help_exits_one() {
        assert_eq!(init(&Context::default(), &["--help".to_string()]).unwrap(), 1);
    }
}
