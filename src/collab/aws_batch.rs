//! collab::aws_batch
//!
//! Cloud batch sink backed by the `aws` CLI.
//!
//! # Submission
//!
//! ```text
//! aws batch submit-job --job-name <module>-<uuid> --job-queue <queue>
//!     --job-definition <definition> --container-overrides <json> [--region <region>]
//! ```
//!
//! The container override carries the module arguments as the command and
//! the image as `BIOSHED_MODULE_IMAGE`. The queue and job definition come
//! from the config `[batch]` table or the provider state file.
//!
//! Only AWS is supported; a GCP descriptor is rejected before anything runs.

use std::process::Command;

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::traits::{BatchSubmitter, CollabError, JobInfo};
use crate::core::config::{ConfigError, Settings};
use crate::core::types::{ExecutionDescriptor, Provider};

/// Program used for submission.
const AWS_CLI: &str = "aws";

/// Environment variable naming the image inside the batch job.
pub const MODULE_IMAGE_ENV: &str = "BIOSHED_MODULE_IMAGE";

/// Submits descriptors to AWS Batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsBatchSubmitter {
    provider: Provider,
    job_queue: Option<String>,
    job_definition: Option<String>,
    region: Option<String>,
    registry: Option<String>,
    program: String,
}

/// Relevant part of the `submit-job` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitJobResponse {
    job_id: String,
    job_name: String,
}

impl AwsBatchSubmitter {
    /// Build a submitter from the configured provider and its state.
    ///
    /// An unreadable provider state file leaves the queue and definition
    /// unset, so submission fails with `NotConfigured` instead of blocking
    /// local runs.
    ///
    /// # Errors
    ///
    /// Fails if the configured provider is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let provider = settings.provider()?;
        let state = settings.provider_state(provider).unwrap_or_else(|e| {
            tracing::warn!(%provider, error = %e, "ignoring unreadable provider state");
            Default::default()
        });
        Ok(Self {
            provider,
            job_queue: settings.job_queue(&state).map(str::to_string),
            job_definition: settings.job_definition(&state).map(str::to_string),
            region: state.region.clone(),
            registry: settings.module_registry().map(str::to_string),
            program: AWS_CLI.to_string(),
        })
    }

    /// Use a different program in place of `aws`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to the `aws` CLI.
    ///
    /// # Errors
    ///
    /// - `CollabError::UnsupportedProvider` for a non-AWS provider
    /// - `CollabError::NotConfigured` without a queue or job definition
    pub fn submit_args(
        &self,
        descriptor: &ExecutionDescriptor,
        job_name: &str,
    ) -> Result<Vec<String>, CollabError> {
        if self.provider != Provider::Aws {
            return Err(CollabError::UnsupportedProvider(self.provider.name().to_string()));
        }
        let queue = self
            .job_queue
            .as_deref()
            .ok_or_else(|| CollabError::NotConfigured("batch job queue".to_string()))?;
        let definition = self
            .job_definition
            .as_deref()
            .ok_or_else(|| CollabError::NotConfigured("batch job definition".to_string()))?;

        let overrides = json!({
            "command": descriptor.args,
            "environment": [{
                "name": MODULE_IMAGE_ENV,
                "value": descriptor.module.image(self.registry.as_deref()),
            }],
        });

        let mut args: Vec<String> = [
            "batch",
            "submit-job",
            "--job-name",
            job_name,
            "--job-queue",
            queue,
            "--job-definition",
            definition,
            "--container-overrides",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(overrides.to_string());

        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        Ok(args)
    }
}

/// Job name for a module: `<module>-<uuid>`.
pub fn job_name(module: &str) -> String {
    format!("{}-{}", module, Uuid::new_v4())
}

/// Parse the JSON printed by `aws batch submit-job`.
fn parse_response(program: &str, stdout: &[u8]) -> Result<JobInfo, CollabError> {
    let response: SubmitJobResponse =
        serde_json::from_slice(stdout).map_err(|e| CollabError::BadOutput {
            program: program.to_string(),
            message: e.to_string(),
        })?;
    Ok(JobInfo {
        job_id: response.job_id,
        job_name: response.job_name,
    })
}

impl BatchSubmitter for AwsBatchSubmitter {
    fn submit(&self, descriptor: &ExecutionDescriptor) -> Result<JobInfo, CollabError> {
        let name = job_name(&descriptor.module.name);
        let args = self.submit_args(descriptor, &name)?;

        tracing::debug!(job_name = %name, "submitting batch job");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| CollabError::Launch {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CollabError::Failed {
                program: self.program.clone(),
                status: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_response(&self.program, &output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BatchConfig, ConfigFile};
    use crate::core::paths::BioshedPaths;
    use crate::core::types::{ExecutionMode, ModuleReference};
    use std::fs;
    use tempfile::TempDir;

    fn descriptor() -> ExecutionDescriptor {
        ExecutionDescriptor {
            mode: ExecutionMode::CloudBatch,
            module: ModuleReference::new("bwa"),
            args: vec!["mem".into(), "s3://bucket/ref.fa".into()],
            mounts: Default::default(),
            env: None,
            sudo_user: None,
        }
    }

    fn submitter(file: ConfigFile) -> (TempDir, AwsBatchSubmitter) {
        let dir = TempDir::new().unwrap();
        let paths = BioshedPaths::new(dir.path().to_path_buf());
        let settings = Settings::new(paths, file);
        let submitter = AwsBatchSubmitter::from_settings(&settings).unwrap();
        (dir, submitter)
    }

    fn configured() -> ConfigFile {
        ConfigFile {
            batch: Some(BatchConfig {
                job_queue: Some("queue".into()),
                job_definition: Some("jobdef".into()),
            }),
            ..Default::default()
        }
    }

    mod args {
        use super::*;

        #[test]
        fn submit_args_layout() {
            let (_dir, s) = submitter(configured());
            let args = s.submit_args(&descriptor(), "bwa-1").unwrap();
            assert_eq!(
                &args[..9],
                &[
                    "batch",
                    "submit-job",
                    "--job-name",
                    "bwa-1",
                    "--job-queue",
                    "queue",
                    "--job-definition",
                    "jobdef",
                    "--container-overrides",
                ]
            );
            let overrides: serde_json::Value = serde_json::from_str(&args[9]).unwrap();
            assert_eq!(overrides["command"], json!(["mem", "s3://bucket/ref.fa"]));
            assert_eq!(overrides["environment"][0]["value"], "bwa:latest");
            assert_eq!(args.len(), 10);
        }

        #[test]
        fn region_from_provider_state() {
            let dir = TempDir::new().unwrap();
            let paths = BioshedPaths::new(dir.path().to_path_buf());
            fs::write(
                paths.provider_state_path(Provider::Aws),
                r#"{"region": "us-west-2", "job_queue": "q", "job_definition": "d"}"#,
            )
            .unwrap();
            let s = AwsBatchSubmitter::from_settings(&Settings::new(paths, ConfigFile::default()))
                .unwrap();
            let args = s.submit_args(&descriptor(), "x").unwrap();
            assert_eq!(&args[args.len() - 2..], &["--region", "us-west-2"]);
            assert!(args.contains(&"q".to_string()));
        }

        #[test]
        fn gcp_is_unsupported() {
            let (_dir, s) = submitter(ConfigFile {
                provider: Some("google".into()),
                ..configured()
            });
            let err = s.submit_args(&descriptor(), "x").unwrap_err();
            assert_eq!(err, CollabError::UnsupportedProvider("gcp".into()));
        }

        #[test]
        fn missing_queue_is_not_configured() {
            let (_dir, s) = submitter(ConfigFile::default());
            let err = s.submit_args(&descriptor(), "x").unwrap_err();
            assert!(matches!(err, CollabError::NotConfigured(_)));
        }
    }

    #[test]
    fn job_name_has_module_prefix() {
        let name = job_name("bwa");
        assert!(name.starts_with("bwa-"));
        assert!(Uuid::parse_str(&name["bwa-".len()..]).is_ok());
        assert_ne!(job_name("bwa"), job_name("bwa"));
    }

    #[test]
    fn response_parsing() {
        let info = parse_response(
            "aws",
            br#"{"jobArn": "arn:x", "jobName": "bwa-1", "jobId": "abc-123"}"#,
        )
        .unwrap();
        assert_eq!(info.job_id, "abc-123");
        assert_eq!(info.job_name, "bwa-1");

        let err = parse_response("aws", b"not json").unwrap_err();
        assert!(matches!(err, CollabError::BadOutput { .. }));
    }

    #[test]
    fn missing_cli_is_launch_error() {
        let (_dir, s) = submitter(configured());
        let err = s
            .with_program("bioshed-no-such-aws")
            .submit(&descriptor())
            .unwrap_err();
        assert!(matches!(err, CollabError::Launch { .. }));
    }
}
