//! engine::mounts
//!
//! Volume and environment planning for local container runs.
//!
//! # Container Layout
//!
//! | Container path | Host source |
//! |----------------|-------------|
//! | `/input/` | `--inputdir` |
//! | `/output/` | working directory (relabeled), unless output goes to remote storage |
//! | `/data/` | biocontainers: `--inputdir`, else the working directory |
//!
//! When the module arguments point at `s3://` or `gcp://` storage and no env
//! file was given, the provider's default env file is resolved so the
//! container can reach the bucket.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::collab::EnvFileResolver;
use crate::core::types::{EnvSource, ExecutionMode, MountBinding, MountMode, Provider};

use super::ResolveWarning;

pub const INPUT_DIR: &str = "/input/";
pub const OUTPUT_DIR: &str = "/output/";
pub const DATA_DIR: &str = "/data/";

/// Everything the planner looks at.
#[derive(Debug, Clone)]
pub struct MountRequest<'a> {
    pub mode: ExecutionMode,
    /// The module came from the biocontainers registry.
    pub biocontainers: bool,
    pub args: &'a [String],
    /// Working directory snapshot for this invocation.
    pub work_dir: &'a Path,
    /// Raw `--inputdir` value.
    pub input_dir: Option<&'a str>,
    /// Raw `--aws-env-file` value.
    pub env_file: Option<&'a str>,
    /// `--aws-env-file` appeared, even without a value.
    pub env_flag_given: bool,
    pub init_dir: &'a Path,
}

/// Planned mounts and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountPlan {
    pub mounts: BTreeSet<MountBinding>,
    pub env: Option<EnvSource>,
    pub warnings: Vec<ResolveWarning>,
}

/// Resolve a host path argument against the working directory.
///
/// `.` is the working directory itself.
pub fn host_path(raw: &str, work_dir: &Path) -> PathBuf {
    let raw = raw.trim();
    if raw == "." {
        return work_dir.to_path_buf();
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    }
}

/// First remote storage provider referenced by the arguments.
pub fn remote_storage(args: &[String]) -> Option<Provider> {
    args.iter().find_map(|a| Provider::for_storage_uri(a))
}

/// Plan mounts and the env file for a descriptor.
pub fn plan(request: &MountRequest<'_>, env_files: &dyn EnvFileResolver) -> MountPlan {
    let mut plan = MountPlan {
        env: request
            .env_file
            .map(|p| EnvSource::new(host_path(p, request.work_dir))),
        ..Default::default()
    };

    if request.mode == ExecutionMode::CloudBatch {
        return plan;
    }

    let remote = remote_storage(request.args);
    let input_dir = request.input_dir.map(|d| host_path(d, request.work_dir));

    if request.biocontainers {
        // Biocontainers images read and write everything under /data/.
        let source = input_dir.unwrap_or_else(|| request.work_dir.to_path_buf());
        plan.mounts.insert(MountBinding::new(source, DATA_DIR));
    } else {
        if let Some(dir) = input_dir {
            plan.mounts.insert(MountBinding::new(dir, INPUT_DIR));
        }
        if remote.is_none() {
            plan.mounts.insert(
                MountBinding::new(request.work_dir, OUTPUT_DIR).with_mode(MountMode::Relabel),
            );
        }
    }

    if let Some(provider) = remote {
        if !request.env_flag_given {
            match env_files.resolve_default_env_file(provider, request.init_dir) {
                Ok(path) => {
                    tracing::debug!(%provider, path = %path.display(), "using default env file");
                    plan.env = Some(EnvSource::new(path));
                }
                Err(e) => {
                    tracing::warn!(%provider, error = %e, "no default env file");
                    plan.warnings.push(ResolveWarning::DefaultEnvFileUnavailable {
                        provider,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::MockEnvFiles;
    use crate::core::types::ModuleReference;
    use crate::engine::module::BIOCONTAINERS_REGISTRY;

    const WORK: &str = "/home/ada/project";

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn request<'a>(
        module: &'a ModuleReference,
        args: &'a [String],
        input_dir: Option<&'a str>,
        env_file: Option<&'a str>,
    ) -> MountRequest<'a> {
        MountRequest {
            mode: ExecutionMode::LocalContainer,
            biocontainers: module.registry.as_deref() == Some(BIOCONTAINERS_REGISTRY),
            args,
            work_dir: Path::new(WORK),
            input_dir,
            env_file,
            env_flag_given: env_file.is_some(),
            init_dir: Path::new("/init"),
        }
    }

    fn output_mount() -> MountBinding {
        MountBinding::new(WORK, OUTPUT_DIR).with_mode(MountMode::Relabel)
    }

    #[test]
    fn local_run_mounts_working_dir_as_output() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["mem", "ref.fa"]);
        let plan = plan(&request(&module, &args, None, None), &MockEnvFiles::default());
        assert_eq!(plan.mounts.into_iter().collect::<Vec<_>>(), vec![output_mount()]);
        assert!(plan.env.is_none());
    }

    #[test]
    fn inputdir_mounts_input() {
        let module = ModuleReference::new("fastqc");
        let args = strings(&["-h"]);
        let plan = plan(
            &request(&module, &args, Some("/data"), None),
            &MockEnvFiles::default(),
        );
        assert!(plan.mounts.contains(&MountBinding::new("/data", INPUT_DIR)));
        assert!(plan.mounts.contains(&output_mount()));
        assert_eq!(plan.mounts.len(), 2);
    }

    #[test]
    fn dot_inputdir_is_working_dir() {
        let module = ModuleReference::new("fastqc");
        let args = strings(&[]);
        let plan = plan(&request(&module, &args, Some("."), None), &MockEnvFiles::default());
        assert!(plan.mounts.contains(&MountBinding::new(WORK, INPUT_DIR)));
    }

    #[test]
    fn relative_inputdir_is_resolved() {
        assert_eq!(
            host_path("reads", Path::new(WORK)),
            PathBuf::from("/home/ada/project/reads")
        );
    }

    #[test]
    fn s3_output_skips_output_mount_and_injects_env() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["mem", "s3://bucket/ref.fa"]);
        let env_files = MockEnvFiles::with_default("/init/aws.env");
        let plan = plan(&request(&module, &args, None, None), &env_files);
        assert!(plan.mounts.is_empty());
        assert_eq!(plan.env, Some(EnvSource::new("/init/aws.env")));
        assert_eq!(env_files.requests(), vec![Provider::Aws]);
    }

    #[test]
    fn gcp_output_skips_output_mount() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["gcp://bucket/out"]);
        let env_files = MockEnvFiles::with_default("/init/gcp.env");
        let plan = plan(&request(&module, &args, None, None), &env_files);
        assert!(plan.mounts.is_empty());
        assert_eq!(env_files.requests(), vec![Provider::Gcp]);
    }

    #[test]
    fn explicit_env_file_wins() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["s3://bucket/x"]);
        let env_files = MockEnvFiles::with_default("/init/aws.env");
        let plan = plan(&request(&module, &args, None, Some("my.env")), &env_files);
        assert_eq!(plan.env, Some(EnvSource::new("/home/ada/project/my.env")));
        assert!(env_files.requests().is_empty());
    }

    #[test]
    fn env_flag_without_path_suppresses_default() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["s3://bucket/x"]);
        let env_files = MockEnvFiles::with_default("/init/aws.env");
        let mut req = request(&module, &args, None, None);
        req.env_flag_given = true;
        let plan = plan(&req, &env_files);
        assert!(plan.env.is_none());
        assert!(env_files.requests().is_empty());
    }

    #[test]
    fn unresolvable_env_file_is_a_warning() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["s3://bucket/x"]);
        let plan = plan(&request(&module, &args, None, None), &MockEnvFiles::default());
        assert!(plan.env.is_none());
        assert!(matches!(
            plan.warnings.as_slice(),
            [ResolveWarning::DefaultEnvFileUnavailable {
                provider: Provider::Aws,
                ..
            }]
        ));
    }

    #[test]
    fn biocontainers_mount_data() {
        let module = ModuleReference::new("samtools").with_registry(BIOCONTAINERS_REGISTRY);
        let args = strings(&["view", "-h"]);
        let plan = plan(&request(&module, &args, None, None), &MockEnvFiles::default());
        assert_eq!(
            plan.mounts.into_iter().collect::<Vec<_>>(),
            vec![MountBinding::new(WORK, DATA_DIR)]
        );
    }

    #[test]
    fn biocontainers_inputdir_replaces_data_source() {
        let module = ModuleReference::new("samtools").with_registry(BIOCONTAINERS_REGISTRY);
        let args = strings(&["view"]);
        let plan = plan(
            &request(&module, &args, Some("/reads"), None),
            &MockEnvFiles::default(),
        );
        assert_eq!(
            plan.mounts.into_iter().collect::<Vec<_>>(),
            vec![MountBinding::new("/reads", DATA_DIR)]
        );
    }

    #[test]
    fn cloud_batch_has_no_mounts() {
        let module = ModuleReference::new("bwa");
        let args = strings(&["mem"]);
        let mut req = request(&module, &args, None, None);
        req.mode = ExecutionMode::CloudBatch;
        let plan = plan(&req, &MockEnvFiles::default());
        assert!(plan.mounts.is_empty());
        assert!(plan.env.is_none());
    }
}
