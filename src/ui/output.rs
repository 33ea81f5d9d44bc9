//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! User-facing output goes to stdout and respects the quiet flag. Errors
//! and warnings go to stderr. Diagnostics belong in `tracing`, not here.

use std::fmt::Display;

use crate::collab::JobInfo;
use crate::core::types::{ExecutionDescriptor, ExecutionMode};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: impl IntoIterator<Item = T>, prefix: &str) -> String {
    items
        .into_iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-paragraph summary of a descriptor.
pub fn format_descriptor(descriptor: &ExecutionDescriptor, registry: Option<&str>) -> String {
    let mut lines = vec![format!(
        "{} ({})",
        descriptor.module.image(registry),
        descriptor.mode
    )];
    if !descriptor.args.is_empty() {
        lines.push(format!("  args:  {}", descriptor.args.join(" ")));
    }
    for mount in &descriptor.mounts {
        lines.push(format!("  mount: {}", mount.volume_spec()));
    }
    if let Some(env) = &descriptor.env {
        lines.push(format!("  env:   {}", env.path.display()));
    }
    if let Some(user) = &descriptor.sudo_user {
        lines.push(format!("  user:  {}", user));
    }
    lines.join("\n")
}

/// Confirmation line for a submitted batch job.
pub fn format_job(job: &JobInfo) -> String {
    format!("Submitted job {} ({})", job.job_name, job.job_id)
}

/// Note shown before a local run that reads remote storage without an env
/// file.
pub fn credentials_hint(descriptor: &ExecutionDescriptor) -> Option<&'static str> {
    (descriptor.mode == ExecutionMode::LocalContainer
        && descriptor.env.is_none()
        && descriptor.references_remote_storage())
    .then_some(
        "If you get a cloud credentials error, pass an env file: --aws-env-file <path>",
    )
}
