//! config command - Get, set, or list configuration values

use crate::cli::commands::load_settings;
use crate::core::config::Settings;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};

/// List every known key with its value.
pub fn list(ctx: &Context) -> Result<i32> {
    let settings = load_settings()?;
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);

    match settings.source() {
        Some(path) => output::print(format!("# {}", path.display()), verbosity),
        None => output::print("# no config file; showing defaults", verbosity),
    }
    for line in render(&settings)? {
        println!("{}", line);
    }
    Ok(0)
}

/// Get a configuration value.
///
/// Unset keys print nothing.
pub fn get(_ctx: &Context, key: &str) -> Result<i32> {
    let settings = load_settings()?;
    if let Some(value) = settings.get(key)? {
        println!("{}", value);
    }
    Ok(0)
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<i32> {
    let mut settings = load_settings()?;
    settings.set(key, value)?;
    let path = settings.save().context("Failed to write config")?;

    output::print(
        format!("Set {} = {} ({})", key, value, path.display()),
        Verbosity::from_flags(ctx.quiet, ctx.debug),
    );
    Ok(0)
}

/// `key = value` lines for every key, `<unset>` when empty.
fn render(settings: &Settings) -> Result<Vec<String>> {
    Settings::KEYS
        .iter()
        .map(|key| {
            let value = settings.get(key)?.unwrap_or_else(|| "<unset>".to_string());
            Ok(format!("{} = {}", key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BatchConfig, ConfigFile};
    use crate::core::paths::BioshedPaths;
    use std::path::PathBuf;

    #[test]
    fn render_lists_all_keys() {
        let settings = Settings::new(
            BioshedPaths::new(PathBuf::from("/init")),
            ConfigFile {
                provider: Some("gcp".into()),
                batch: Some(BatchConfig {
                    job_queue: Some("q".into()),
                    job_definition: None,
                }),
                ..Default::default()
            },
        );
        let lines = render(&settings).unwrap();
        assert_eq!(lines.len(), Settings::KEYS.len());
        assert!(lines.contains(&"provider = gcp".to_string()));
        assert!(lines.contains(&"batch.job_queue = q".to_string()));
        assert!(lines.contains(&"batch.job_definition = <unset>".to_string()));
    }
}
