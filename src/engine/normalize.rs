//! engine::normalize
//!
//! Special-case rewrites applied to the raw token stream before general
//! resolution.
//!
//! # Rules
//!
//! Rules are evaluated in [`RULES`] order and the first one whose trigger
//! matches wins. At most one rule fires per invocation.
//!
//! 1. `example` - trailing `--example`: force a local run of the module's
//!    bundled example.
//! 2. `help` - trailing `--help` after a module: render the module's help
//!    locally instead of submitting a cloud job.
//! 3. `list` - `run --list`: list runnable modules and stop.
//!
//! # Example
//!
//! ```
//! use bioshed::core::types::RawInvocation;
//! use bioshed::engine::normalize::{normalize, Normalized};
//!
//! let raw = RawInvocation::new(["run", "fastqc", "--example"]);
//! match normalize(&raw) {
//!     Normalized::Tokens(n) => {
//!         assert_eq!(n.tokens, vec!["run", "--local", "fastqc"]);
//!         assert!(n.example);
//!     }
//!     Normalized::List => unreachable!(),
//! }
//! ```

use crate::core::types::RawInvocation;

use super::options::{scan_flags, DispatcherFlag};

pub const EXAMPLE_FLAG: &str = "--example";
pub const HELP_FLAG: &str = "--help";
pub const LIST_FLAG: &str = "--list";
pub const LOCAL_FLAG: &str = "--local";

/// Token stream after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTokens {
    /// Sub-command followed by the rewritten tokens.
    pub tokens: Vec<String>,
    /// The invocation asked for the module's example.
    pub example: bool,
    /// Name of the rule that fired, if any.
    pub rule: Option<&'static str>,
}

/// Outcome of normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Continue resolution with these tokens.
    Tokens(NormalizedTokens),
    /// Stop and list available modules.
    List,
}

/// What a matching rule does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    Tokens { tokens: Vec<String>, example: bool },
    List,
}

/// A single rewrite rule.
pub struct Rule {
    pub name: &'static str,
    /// Returns `None` when the rule does not apply.
    pub apply: fn(&RawInvocation) -> Option<Rewrite>,
}

/// Rewrite rules in precedence order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "example",
        apply: example_rule,
    },
    Rule {
        name: "help",
        apply: help_rule,
    },
    Rule {
        name: "list",
        apply: list_rule,
    },
];

/// Apply the first matching rule.
pub fn normalize(raw: &RawInvocation) -> Normalized {
    for rule in RULES {
        if let Some(rewrite) = (rule.apply)(raw) {
            tracing::debug!(rule = rule.name, "normalizer rule applied");
            return match rewrite {
                Rewrite::Tokens { tokens, example } => Normalized::Tokens(NormalizedTokens {
                    tokens,
                    example,
                    rule: Some(rule.name),
                }),
                Rewrite::List => Normalized::List,
            };
        }
    }

    Normalized::Tokens(NormalizedTokens {
        tokens: raw.tokens().to_vec(),
        example: false,
        rule: None,
    })
}

/// Insert `--local` right after the sub-command unless it is already one of
/// the dispatcher flags in front of the module.
///
/// A `--local` among the module's own arguments does not count.
pub fn insert_local(tokens: &[String]) -> Vec<String> {
    if tokens.is_empty() || has_dispatcher_local(&tokens[1..]) {
        return tokens.to_vec();
    }
    let mut out = Vec::with_capacity(tokens.len() + 1);
    out.push(tokens[0].clone());
    out.push(LOCAL_FLAG.to_string());
    out.extend_from_slice(&tokens[1..]);
    out
}

/// Whether `--local` appears in the flag region of `tokens` (sub-command
/// excluded). A malformed flag region counts as no `--local`; the scan in
/// resolution reports it.
fn has_dispatcher_local(tokens: &[String]) -> bool {
    scan_flags(tokens).is_ok_and(|scanned| scanned.flags.contains(&DispatcherFlag::Local))
}

fn is_run(raw: &RawInvocation) -> bool {
    raw.subcommand() == Some("run")
}

fn last_is(raw: &RawInvocation, flag: &str) -> bool {
    raw.tokens().last().map(String::as_str) == Some(flag)
}

fn example_rule(raw: &RawInvocation) -> Option<Rewrite> {
    if !last_is(raw, EXAMPLE_FLAG) {
        return None;
    }
    let tokens = raw.tokens();
    let trimmed = &tokens[..tokens.len() - 1];
    let tokens = if is_run(raw) {
        insert_local(trimmed)
    } else {
        trimmed.to_vec()
    };
    Some(Rewrite::Tokens {
        tokens,
        example: true,
    })
}

fn help_rule(raw: &RawInvocation) -> Option<Rewrite> {
    let tokens = raw.tokens();
    if !last_is(raw, HELP_FLAG) || tokens.len() < 3 || raw.references_biocontainers() {
        return None;
    }
    let second_to_last = tokens[tokens.len() - 2].as_str();
    if matches!(second_to_last, "run" | "runlocal") {
        return None;
    }
    let tokens = if is_run(raw) {
        insert_local(tokens)
    } else {
        tokens.to_vec()
    };
    Some(Rewrite::Tokens {
        tokens,
        example: false,
    })
}

fn list_rule(raw: &RawInvocation) -> Option<Rewrite> {
    (last_is(raw, LIST_FLAG) && raw.tokens().len() == 2 && !raw.references_biocontainers())
        .then_some(Rewrite::List)
}
