//! run command - Resolve and dispatch a module invocation

use crate::cli::commands::load_settings;
use crate::collab;
use crate::core::types::RawInvocation;
use crate::engine::{self, Collaborators, Context, HelpTopic, Outcome, ResolveError, Sinks};
use crate::ui::help;
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};

/// Exit code for usage errors (255 on Unix).
pub const USAGE_EXIT: i32 = -1;

/// Handle `run` and `runlocal`.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `subcommand` - `run` or `runlocal`
/// * `tokens` - Everything after the sub-command, verbatim
pub fn run(ctx: &Context, subcommand: &str, tokens: Vec<String>) -> Result<i32> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let settings = load_settings()?;
    let work_dir = ctx
        .working_dir()
        .context("Failed to determine working directory")?;

    let raw = RawInvocation::new(std::iter::once(subcommand.to_string()).chain(tokens));

    let cloud = collab::create_cloud_state(&settings).context("Invalid provider configuration")?;
    let catalog = collab::create_catalog(&settings);
    let collaborators = Collaborators {
        cloud: &cloud,
        env_files: &cloud,
        catalog: &catalog,
    };

    let outcome = match engine::resolve(&raw, &work_dir, &settings, &collaborators) {
        Ok(outcome) => outcome,
        Err(ResolveError::Usage(e)) => {
            output::error(&e);
            output::print("Type \"bioshed run --help\" for full documentation.", verbosity);
            return Ok(USAGE_EXIT);
        }
        Err(e) => return Err(e).context("Failed to resolve invocation"),
    };

    let code = outcome.exit_code();
    let resolution = match outcome {
        Outcome::Help(HelpTopic::Run) => {
            println!("{}", help::RUN_HELP);
            return Ok(code);
        }
        Outcome::Help(HelpTopic::Biocontainers) => {
            println!("{}", help::BIOCONTAINERS_HELP);
            return Ok(code);
        }
        Outcome::Listing(modules) => {
            println!("{}", help::module_listing(&modules));
            return Ok(code);
        }
        Outcome::Descriptor(resolution) => resolution,
    };

    for warning in &resolution.warnings {
        output::warn(warning, verbosity);
    }

    let descriptor = &resolution.descriptor;
    if ctx.dry_run {
        let json = serde_json::to_string_pretty(descriptor)
            .context("Failed to serialize execution descriptor")?;
        println!("{}", json);
        return Ok(0);
    }

    tracing::info!(
        module = %descriptor.module.name,
        mode = %descriptor.mode,
        args = ?descriptor.args,
        "dispatching"
    );
    output::debug(
        output::format_descriptor(descriptor, settings.module_registry()),
        verbosity,
    );
    if let Some(hint) = output::credentials_hint(descriptor) {
        tracing::info!("{}", hint);
    }

    let runner = collab::create_container_runner(&settings);
    let submitter =
        collab::create_batch_submitter(&settings).context("Invalid provider configuration")?;
    let sinks = Sinks {
        batch: &submitter,
        container: &runner,
    };

    match engine::dispatch(descriptor, &sinks) {
        Ok(engine::Dispatched::Submitted(job)) => {
            output::print(output::format_job(&job), verbosity)
        }
        Ok(engine::Dispatched::Ran) => {}
        Err(e) => {
            output::error(&e);
            return Ok(e.exit_code());
        }
    }
    Ok(0)
}
