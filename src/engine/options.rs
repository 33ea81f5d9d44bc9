//! engine::options
//!
//! Dispatcher option extraction.
//!
//! Two entry points share this module:
//!
//! - [`extract_options`] handles the simple `--name value` / `--name` syntax
//!   used by auxiliary sub-commands such as `init`.
//! - [`scan_flags`] is the fixed-arity scanning loop in front of a module
//!   name in `run` / `runlocal` invocations.
//!
//! # Flag Table
//!
//! | Flag | Arity | Effect |
//! |------|-------|--------|
//! | `--aws-env-file` | 2 | env file for the container |
//! | `--local` | 1 | force local container execution |
//! | `--inputdir` | 2 | mount a host input directory (implies `--local`) |
//! | `--help` | 1 | print run help, no descriptor |
//! | `-u` | 2 | run as this user |
//!
//! Scanning stops at the first token that neither starts with `--` nor is
//! `-u`. Unknown `--` tokens in that position are rejected.

use std::collections::BTreeMap;

use super::{ResolveWarning, UsageError};

/// Prefix marking a long option.
pub const LONG_PREFIX: &str = "--";

/// Short flag carrying the user to run as.
pub const SUDO_USER_FLAG: &str = "-u";

/// Options and passthrough tokens split by [`extract_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherOptions {
    /// Option name (without `--`) to value; flags map to `""`.
    pub options: BTreeMap<String, String>,
    /// Tokens that were not consumed as options, in order.
    pub passthrough: Vec<String>,
}

impl DispatcherOptions {
    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Option names not in `known`, sorted.
    pub fn unknown<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        self.options
            .keys()
            .map(String::as_str)
            .filter(|k| !known.contains(k))
            .collect()
    }
}

/// Split `--name value` / `--name` options from the remaining tokens.
///
/// An option takes the following token as its value unless that token is
/// itself an option. Later duplicates overwrite earlier ones.
///
/// # Example
///
/// ```
/// use bioshed::engine::options::extract_options;
///
/// let parsed = extract_options(&["--keyfile", "my.pub", "--dryrun", "extra"]);
/// assert_eq!(parsed.get("keyfile"), Some("my.pub"));
/// assert_eq!(parsed.get("dryrun"), Some(""));
/// assert_eq!(parsed.passthrough, vec!["extra".to_string()]);
/// ```
pub fn extract_options<S: AsRef<str>>(tokens: &[S]) -> DispatcherOptions {
    let mut out = DispatcherOptions::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_ref();
        match token.strip_prefix(LONG_PREFIX) {
            Some(name) => {
                let value = tokens
                    .get(i + 1)
                    .map(AsRef::as_ref)
                    .filter(|next| !next.starts_with(LONG_PREFIX));
                match value {
                    Some(v) => {
                        out.options.insert(name.to_string(), v.to_string());
                        i += 2;
                    }
                    None => {
                        out.options.insert(name.to_string(), String::new());
                        i += 1;
                    }
                }
            }
            None => {
                out.passthrough.push(token.to_string());
                i += 1;
            }
        }
    }

    out
}

/// A recognized dispatcher flag with its consumed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatcherFlag {
    /// `--aws-env-file <path>`; `None` when the path was missing.
    AwsEnvFile(Option<String>),
    /// `--local`
    Local,
    /// `--inputdir <path>`
    InputDir(String),
    /// `--help`
    Help,
    /// `-u <user>`
    SudoUser(String),
}

/// Result of scanning the dispatcher flags in front of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedFlags {
    /// Flags in the order they appeared.
    pub flags: Vec<DispatcherFlag>,
    /// Module candidate followed by its arguments.
    pub rest: Vec<String>,
    /// Non-fatal problems found while scanning.
    pub warnings: Vec<ResolveWarning>,
}

impl ScannedFlags {
    /// `--local` was given, or implied by `--inputdir`.
    pub fn forces_local(&self) -> bool {
        self.flags
            .iter()
            .any(|f| matches!(f, DispatcherFlag::Local | DispatcherFlag::InputDir(_)))
    }

    pub fn wants_help(&self) -> bool {
        self.flags.contains(&DispatcherFlag::Help)
    }

    /// Last `--aws-env-file` path given.
    pub fn env_file(&self) -> Option<&str> {
        self.flags.iter().rev().find_map(|f| match f {
            DispatcherFlag::AwsEnvFile(Some(path)) => Some(path.as_str()),
            _ => None,
        })
    }

    /// Whether `--aws-env-file` appeared at all, with or without a path.
    pub fn env_file_flag_given(&self) -> bool {
        self.flags
            .iter()
            .any(|f| matches!(f, DispatcherFlag::AwsEnvFile(_)))
    }

    /// Last `--inputdir` given.
    pub fn input_dir(&self) -> Option<&str> {
        self.flags.iter().rev().find_map(|f| match f {
            DispatcherFlag::InputDir(dir) => Some(dir.as_str()),
            _ => None,
        })
    }

    /// Last `-u` user given.
    pub fn sudo_user(&self) -> Option<&str> {
        self.flags.iter().rev().find_map(|f| match f {
            DispatcherFlag::SudoUser(user) => Some(user.as_str()),
            _ => None,
        })
    }

    /// The module candidate, if any.
    pub fn module_token(&self) -> Option<&str> {
        self.rest.first().map(String::as_str)
    }
}

fn is_flag_position(token: &str) -> bool {
    token.starts_with(LONG_PREFIX) || token == SUDO_USER_FLAG
}

/// Scan dispatcher flags in front of the module name.
///
/// `tokens` excludes the sub-command. `--help` stops the scan immediately
/// since nothing after it is resolved.
///
/// # Errors
///
/// - `UsageError::UnknownFlag` for a `--` token outside the flag table
/// - `UsageError::MissingValue` for `--inputdir` or `-u` without a value
pub fn scan_flags<S: AsRef<str>>(tokens: &[S]) -> Result<ScannedFlags, UsageError> {
    let mut scanned = ScannedFlags::default();
    let mut i = 0;

    while let Some(token) = tokens.get(i).map(AsRef::as_ref) {
        if !is_flag_position(token) {
            break;
        }
        let value = tokens.get(i + 1).map(AsRef::as_ref);

        match token {
            "--aws-env-file" => match value.filter(|v| !is_flag_position(v)) {
                Some(path) => {
                    scanned
                        .flags
                        .push(DispatcherFlag::AwsEnvFile(Some(path.to_string())));
                    i += 2;
                }
                None => {
                    scanned.flags.push(DispatcherFlag::AwsEnvFile(None));
                    scanned.warnings.push(ResolveWarning::MissingEnvFile);
                    i += 1;
                }
            },
            "--local" => {
                scanned.flags.push(DispatcherFlag::Local);
                i += 1;
            }
            "--inputdir" => {
                let dir = value
                    .filter(|v| !is_flag_position(v))
                    .ok_or(UsageError::MissingValue { flag: "--inputdir" })?;
                scanned.flags.push(DispatcherFlag::InputDir(dir.to_string()));
                i += 2;
            }
            "--help" => {
                scanned.flags.push(DispatcherFlag::Help);
                return Ok(scanned);
            }
            SUDO_USER_FLAG => {
                let user = value
                    .filter(|v| !is_flag_position(v))
                    .ok_or(UsageError::MissingValue { flag: "-u" })?;
                scanned.flags.push(DispatcherFlag::SudoUser(user.to_string()));
                i += 2;
            }
            unknown => return Err(UsageError::UnknownFlag(unknown.to_string())),
        }
    }

    scanned.rest = tokens[i..].iter().map(|t| t.as_ref().to_string()).collect();
    Ok(scanned)
}
