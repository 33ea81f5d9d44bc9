//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! Given before the sub-command:
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--dry-run`: Print the resolved descriptor instead of running it
//!
//! `run` and `runlocal` take their tokens verbatim. Dispatcher flags such as
//! `--local` and `--help` are interpreted by the engine, not by clap, so the
//! module's own flags pass through untouched.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bioshed - run bioinformatics modules in the cloud or in local containers
#[derive(Parser, Debug)]
#[command(name = "bioshed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if bioshed was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the resolved execution descriptor as JSON and stop
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a module; goes to the cloud when a provider is ready
    #[command(
        disable_help_flag = true,
        after_help = "\
EXAMPLES:
    bioshed run fastqc -h
    bioshed run --inputdir ./reads fastqc /input/sample.fq
    bioshed run biocontainers samtools:1.9 view -h
    bioshed run --list
    bioshed run --help        # dispatcher options"
    )]
    Run {
        /// Dispatcher options, module and module arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Run a module in a local container
    #[command(disable_help_flag = true)]
    Runlocal {
        /// Dispatcher options, module and module arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Create the init directory and a default configuration
    #[command(disable_help_flag = true)]
    Init {
        /// --provider <aws|gcp>, --force, --help
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },

    /// Get, set, or list configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show every known key with its value
    List,

    /// Print one value
    Get {
        /// Key, e.g. provider or batch.job_queue
        key: String,
    },

    /// Set one value
    Set {
        /// Key, e.g. provider or batch.job_queue
        key: String,
        /// New value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bioshed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn run_tokens_are_verbatim() {
        let cli = parse(&["run", "--local", "-u", "ada", "fastqc", "-h", "--help"]);
        match cli.command {
            Command::Run { tokens } => {
                assert_eq!(tokens, vec!["--local", "-u", "ada", "fastqc", "-h", "--help"])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_flags_before_subcommand() {
        let cli = parse(&["--dry-run", "--debug", "--cwd", "/tmp", "runlocal", "bwa"]);
        assert!(cli.dry_run);
        assert!(cli.debug);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp")));
        assert!(matches!(cli.command, Command::Runlocal { tokens } if tokens == vec!["bwa"]));
    }

    #[test]
    fn flags_after_run_belong_to_the_module() {
        let cli = parse(&["run", "bwa", "--debug"]);
        assert!(!cli.debug);
    }

    #[test]
    fn init_options() {
        let cli = parse(&["init", "--provider", "gcp", "--force"]);
        assert!(matches!(cli.command, Command::Init { options } if options.len() == 3));
    }

    #[test]
    fn config_set() {
        let cli = parse(&["config", "set", "provider", "gcp"]);
        assert!(matches!(
            cli.command,
            Command::Config { action: ConfigAction::Set { key, value } } if key == "provider" && value == "gcp"
        ));
    }
}
