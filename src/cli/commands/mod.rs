//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads settings for the current user
//! 2. Calls the engine or the config layer
//! 3. Formats and displays output
//!
//! Handlers return the process exit code: usage errors map to
//! [`USAGE_EXIT`] and sink failures to the sink's own code. Other failures
//! propagate as `anyhow` errors and `main` exits with [`FAILURE_EXIT`].

mod config_cmd;
mod init;
mod run;

pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use init::init;
pub use run::{run, USAGE_EXIT};
pub use crate::engine::FAILURE_EXIT;

use crate::cli::args::{Command, ConfigAction};
use crate::core::config::Settings;
use crate::core::paths::BioshedPaths;
use crate::engine::Context;
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<i32> {
    match command {
        Command::Run { tokens } => run::run(ctx, "run", tokens),
        Command::Runlocal { tokens } => run::run(ctx, "runlocal", tokens),
        Command::Init { options } => init::init(ctx, &options),
        Command::Config { action } => match action {
            ConfigAction::List => config_cmd::list(ctx),
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
        },
    }
}

/// Locate the init directory.
pub(crate) fn discover_paths() -> Result<BioshedPaths> {
    BioshedPaths::discover().context("Could not determine a home directory for ~/.bioshedinit")
}

/// Load settings from the standard locations.
pub(crate) fn load_settings() -> Result<Settings> {
    Settings::load(discover_paths()?).context("Failed to load configuration")
}
