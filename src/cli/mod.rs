//! cli
//!
//! Command-line interface layer for bioshed.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers and report their exit code
//!
//! # Architecture
//!
//! The CLI layer is thin. Resolution happens in [`crate::engine`]; the
//! handlers here only wire real collaborators in and render outcomes.

pub mod args;
pub mod commands;

pub use args::Cli;

use crate::engine;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BIOSHED_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Returns the process
/// exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        dry_run: cli.dry_run,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Log to stderr, filtered by `$BIOSHED_LOG` (default `warn`).
///
/// `--debug` raises bioshed's own logs to `debug`.
fn init_tracing(debug: bool) {
    let mut filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if debug {
        if let Ok(directive) = "bioshed=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
