//! engine::dispatch
//!
//! Hands a descriptor to exactly one sink, selected by its mode.

use thiserror::Error;

use crate::collab::{BatchSubmitter, CollabError, ContainerRunner, JobInfo};
use crate::core::types::{ExecutionDescriptor, ExecutionMode};

/// The two terminal sinks.
#[derive(Clone, Copy)]
pub struct Sinks<'a> {
    pub batch: &'a dyn BatchSubmitter,
    pub container: &'a dyn ContainerRunner,
}

/// What the sink did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Submitted(JobInfo),
    Ran,
}

/// Errors from the sinks.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("batch submission failed: {0}")]
    Submit(#[source] CollabError),

    #[error("container run failed: {0}")]
    Run(#[source] CollabError),
}

/// Exit code for a failure that is not a usage error.
pub const FAILURE_EXIT: i32 = 1;

impl DispatchError {
    /// Process exit code for this failure: the container's own status when
    /// it ran and failed, [`FAILURE_EXIT`] otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::Run(CollabError::Failed { status, .. }) if *status > 0 => *status,
            _ => FAILURE_EXIT,
        }
    }
}

/// Dispatch a descriptor.
///
/// # Errors
///
/// Returns the sink's error wrapped by which sink failed.
pub fn dispatch(
    descriptor: &ExecutionDescriptor,
    sinks: &Sinks<'_>,
) -> Result<Dispatched, DispatchError> {
    match descriptor.mode {
        ExecutionMode::CloudBatch => {
            let job = sinks.batch.submit(descriptor).map_err(DispatchError::Submit)?;
            tracing::info!(job_id = %job.job_id, job_name = %job.job_name, "batch job submitted");
            Ok(Dispatched::Submitted(job))
        }
        ExecutionMode::LocalContainer => {
            sinks.container.run(descriptor).map_err(DispatchError::Run)?;
            Ok(Dispatched::Ran)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::{MockBatchSubmitter, MockContainerRunner};
    use crate::core::types::ModuleReference;
    use crate::engine::DescriptorBuilder;

    fn descriptor(mode: ExecutionMode) -> ExecutionDescriptor {
        DescriptorBuilder::new(mode)
            .module(ModuleReference::new("bwa"))
            .args(vec!["mem".into()])
            .build()
            .unwrap()
    }

    #[test]
    fn batch_goes_to_submitter_only() {
        let batch = MockBatchSubmitter::new();
        let container = MockContainerRunner::new();
        let sinks = Sinks {
            batch: &batch,
            container: &container,
        };
        let result = dispatch(&descriptor(ExecutionMode::CloudBatch), &sinks).unwrap();
        assert!(matches!(result, Dispatched::Submitted(_)));
        assert_eq!(batch.submitted().len(), 1);
        assert!(container.runs().is_empty());
    }

    #[test]
    fn local_goes_to_runner_only() {
        let batch = MockBatchSubmitter::new();
        let container = MockContainerRunner::new();
        let sinks = Sinks {
            batch: &batch,
            container: &container,
        };
        let result = dispatch(&descriptor(ExecutionMode::LocalContainer), &sinks).unwrap();
        assert_eq!(result, Dispatched::Ran);
        assert!(batch.submitted().is_empty());
        assert_eq!(container.runs()[0].module.name, "bwa");
    }

    #[test]
    fn sink_failure_is_wrapped() {
        let batch = MockBatchSubmitter::new();
        let container = MockContainerRunner::failing(CollabError::Failed {
            program: "docker".into(),
            status: 125,
            message: "boom".into(),
        });
        let sinks = Sinks {
            batch: &batch,
            container: &container,
        };
        let err = dispatch(&descriptor(ExecutionMode::LocalContainer), &sinks).unwrap_err();
        assert!(matches!(err, DispatchError::Run(_)));
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.exit_code(), 125);
    }

    #[test]
    fn exit_codes() {
        let launch = CollabError::Launch {
            program: "docker".into(),
            message: "not found".into(),
        };
        assert_eq!(DispatchError::Run(launch.clone()).exit_code(), FAILURE_EXIT);
        assert_eq!(DispatchError::Submit(launch).exit_code(), FAILURE_EXIT);

        let killed = CollabError::Failed {
            program: "docker".into(),
            status: -1,
            message: "signal".into(),
        };
        assert_eq!(DispatchError::Run(killed).exit_code(), FAILURE_EXIT);

        let submit_failed = CollabError::Failed {
            program: "aws".into(),
            status: 254,
            message: "denied".into(),
        };
        assert_eq!(DispatchError::Submit(submit_failed).exit_code(), FAILURE_EXIT);
    }
}
