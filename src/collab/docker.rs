//! collab::docker
//!
//! Local container sink.
//!
//! Builds a `docker run --rm` command line from a descriptor and runs it
//! with inherited stdio, so the module's own output reaches the terminal.
//!
//! ```text
//! [sudo -u <user>] <runtime> run --rm [-v host:container[:Z]]... [--env-file <path>] <image> <args>...
//! ```

use std::process::Command;

use super::traits::{CollabError, ContainerRunner};
use crate::core::config::Settings;
use crate::core::types::ExecutionDescriptor;

/// Runs descriptors with a Docker-compatible CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerRunner {
    /// Runtime binary, e.g. `docker` or `podman`.
    runtime: String,
    /// Registry for modules that carry none.
    registry: Option<String>,
}

impl DockerRunner {
    pub fn new(runtime: impl Into<String>, registry: Option<String>) -> Self {
        Self {
            runtime: runtime.into(),
            registry,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.container_runtime(),
            settings.module_registry().map(str::to_string),
        )
    }

    /// Full command line, program first.
    pub fn command_line(&self, descriptor: &ExecutionDescriptor) -> Vec<String> {
        let mut argv = Vec::new();
        if let Some(user) = &descriptor.sudo_user {
            argv.extend(["sudo".to_string(), "-u".to_string(), user.clone()]);
        }
        argv.extend([self.runtime.clone(), "run".to_string(), "--rm".to_string()]);

        for mount in &descriptor.mounts {
            argv.push("-v".to_string());
            argv.push(mount.volume_spec());
        }
        if let Some(env) = &descriptor.env {
            argv.push("--env-file".to_string());
            argv.push(env.path.display().to_string());
        }

        argv.push(descriptor.module.image(self.registry.as_deref()));
        argv.extend(descriptor.args.iter().cloned());
        argv
    }
}

impl ContainerRunner for DockerRunner {
    fn run(&self, descriptor: &ExecutionDescriptor) -> Result<(), CollabError> {
        let argv = self.command_line(descriptor);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CollabError::Launch {
                program: self.runtime.clone(),
                message: "empty command line".to_string(),
            })?;

        tracing::debug!(command = %argv.join(" "), "running container");

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| CollabError::Launch {
                program: program.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CollabError::Failed {
                program: program.clone(),
                status: status.code().unwrap_or(-1),
                message: format!("{} exited unsuccessfully", descriptor.module.name),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EnvSource, ExecutionMode, ModuleReference, MountBinding, MountMode};

    fn descriptor() -> ExecutionDescriptor {
        ExecutionDescriptor {
            mode: ExecutionMode::LocalContainer,
            module: ModuleReference::new("fastqc"),
            args: vec!["-o".into(), "/output/".into(), "a.fq".into()],
            mounts: [
                MountBinding::new("/work", "/output/").with_mode(MountMode::Relabel),
                MountBinding::new("/reads", "/input/"),
            ]
            .into_iter()
            .collect(),
            env: None,
            sudo_user: None,
        }
    }

    #[test]
    fn basic_command_line() {
        let runner = DockerRunner::new("docker", None);
        assert_eq!(
            runner.command_line(&descriptor()),
            vec![
                "docker",
                "run",
                "--rm",
                "-v",
                "/reads:/input/",
                "-v",
                "/work:/output/:Z",
                "fastqc:latest",
                "-o",
                "/output/",
                "a.fq",
            ]
        );
    }

    #[test]
    fn registry_env_and_sudo() {
        let runner = DockerRunner::new("podman", Some("public.ecr.aws/myorg/".into()));
        let mut d = descriptor();
        d.mounts.clear();
        d.env = Some(EnvSource::new("/init/aws.env"));
        d.sudo_user = Some("ada".into());
        let argv = runner.command_line(&d);
        assert_eq!(&argv[..4], &["sudo", "-u", "ada", "podman"]);
        let env_at = argv.iter().position(|a| a == "--env-file").unwrap();
        assert_eq!(argv[env_at + 1], "/init/aws.env");
        assert!(argv.contains(&"public.ecr.aws/myorg/fastqc:latest".to_string()));
    }

    #[test]
    fn module_registry_wins_over_default() {
        let runner = DockerRunner::new("docker", Some("myorg".into()));
        let mut d = descriptor();
        d.module = ModuleReference::new("samtools")
            .with_registry("public.ecr.aws/biocontainers")
            .with_tag("1.9");
        let argv = runner.command_line(&d);
        assert!(argv.contains(&"public.ecr.aws/biocontainers/samtools:1.9".to_string()));
    }

    #[test]
    fn missing_runtime_is_launch_error() {
        let runner = DockerRunner::new("bioshed-no-such-runtime", None);
        let err = runner.run(&descriptor()).unwrap_err();
        assert!(matches!(err, CollabError::Launch { .. }));
    }
}
