//! engine::target
//!
//! Cloud batch vs local container decision.
//!
//! When the user did not ask for a local run, the cloud state collaborator is
//! consulted. A run goes to the cloud only if a provider is authenticated
//! *and* its core infrastructure is deployed. Otherwise `--local` is inserted
//! after the sub-command. This downgrade is silent (debug log only) and
//! idempotent: resolving the rewritten stream again yields the same stream.

use crate::collab::CloudState;
use crate::core::config::Settings;
use crate::core::types::{normalize_module_name, BIOCONTAINERS};

use super::normalize::insert_local;
use super::options::ScannedFlags;

/// Token stream after the target decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDecision {
    pub tokens: Vec<String>,
    /// `--local` was inserted because the cloud is not usable.
    pub downgraded: bool,
}

/// Decide the execution target, rewriting `tokens` to force a local run when
/// needed.
///
/// `scanned` is the flag scan of `tokens` (without the sub-command).
pub fn resolve_target(
    tokens: Vec<String>,
    scanned: &ScannedFlags,
    settings: &Settings,
    cloud: &dyn CloudState,
) -> TargetDecision {
    if tokens.first().map(String::as_str) == Some("runlocal") {
        return TargetDecision {
            tokens: insert_local(&tokens),
            downgraded: false,
        };
    }

    // Local was requested, or the module can only ever run locally.
    let biocontainers = scanned
        .module_token()
        .is_some_and(|m| normalize_module_name(m) == BIOCONTAINERS);
    if scanned.forces_local() || biocontainers {
        return TargetDecision {
            tokens,
            downgraded: false,
        };
    }

    let configured =
        cloud.is_credential_configured() && cloud.is_core_infrastructure_deployed(settings);
    if configured {
        tracing::debug!("cloud provider configured; defaulting to cloud batch");
        return TargetDecision {
            tokens,
            downgraded: false,
        };
    }

    tracing::debug!("cloud provider not configured; running locally");
    TargetDecision {
        tokens: insert_local(&tokens),
        downgraded: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::MockCloudState;
    use crate::core::config::ConfigFile;
    use crate::core::paths::BioshedPaths;
    use crate::engine::options::scan_flags;
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings::new(BioshedPaths::new(PathBuf::from("/init")), ConfigFile::default())
    }

    fn decide(tokens: &[&str], cloud: &MockCloudState) -> TargetDecision {
        let tokens: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        let scanned = scan_flags(&tokens[1..]).unwrap();
        resolve_target(tokens, &scanned, &settings(), cloud)
    }

    #[test]
    fn configured_cloud_keeps_tokens() {
        let cloud = MockCloudState::configured();
        let d = decide(&["run", "fastqc", "-h"], &cloud);
        assert_eq!(d.tokens, vec!["run", "fastqc", "-h"]);
        assert!(!d.downgraded);
        assert_eq!(cloud.queries(), 2);
    }

    #[test]
    fn missing_credentials_downgrade() {
        let cloud = MockCloudState::unconfigured();
        let d = decide(&["run", "fastqc", "-h"], &cloud);
        assert_eq!(d.tokens, vec!["run", "--local", "fastqc", "-h"]);
        assert!(d.downgraded);
    }

    #[test]
    fn missing_infrastructure_downgrades() {
        let cloud = MockCloudState::new(true, false);
        let d = decide(&["run", "fastqc"], &cloud);
        assert!(d.downgraded);
    }

    #[test]
    fn downgrade_is_idempotent() {
        let cloud = MockCloudState::unconfigured();
        let first = decide(&["run", "fastqc", "-h"], &cloud);
        let refs: Vec<&str> = first.tokens.iter().map(String::as_str).collect();
        let second = decide(&refs, &cloud);
        assert_eq!(first.tokens, second.tokens);
    }

    #[test]
    fn explicit_local_skips_query() {
        let cloud = MockCloudState::configured();
        let d = decide(&["run", "--local", "fastqc"], &cloud);
        assert_eq!(d.tokens, vec!["run", "--local", "fastqc"]);
        assert_eq!(cloud.queries(), 0);
    }

    #[test]
    fn inputdir_skips_query() {
        let cloud = MockCloudState::configured();
        decide(&["run", "--inputdir", "/data", "fastqc"], &cloud);
        assert_eq!(cloud.queries(), 0);
    }

    #[test]
    fn biocontainers_skips_query() {
        let cloud = MockCloudState::configured();
        let d = decide(&["run", "BioContainers", "samtools"], &cloud);
        assert!(!d.downgraded);
        assert_eq!(cloud.queries(), 0);
    }

    #[test]
    fn runlocal_always_local() {
        let cloud = MockCloudState::configured();
        let d = decide(&["runlocal", "fastqc"], &cloud);
        assert_eq!(d.tokens, vec!["runlocal", "--local", "fastqc"]);
        assert_eq!(cloud.queries(), 0);
    }
}
