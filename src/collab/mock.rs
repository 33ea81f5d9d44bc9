//! collab::mock
//!
//! Recording collaborators for deterministic testing.
//!
//! # Design
//!
//! Each mock keeps its state behind an `Arc<Mutex<...>>` so clones share
//! what was recorded. Tests configure answers up front and inspect the
//! recorded calls afterwards, e.g. to assert that a usage error was raised
//! before the cloud was ever queried.
//!
//! # Example
//!
//! ```
//! use bioshed::collab::mock::MockCloudState;
//! use bioshed::collab::CloudState;
//!
//! let cloud = MockCloudState::unconfigured();
//! assert!(!cloud.is_credential_configured());
//! assert_eq!(cloud.queries(), 1);
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::traits::{
    BatchSubmitter, CloudState, CollabError, ContainerRunner, EnvFileResolver, JobInfo,
    ModuleCatalog,
};
use crate::core::config::Settings;
use crate::core::types::{ExecutionDescriptor, Provider};

/// Recorded cloud state query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudQuery {
    Credential,
    Infrastructure,
}

#[derive(Debug)]
struct CloudInner {
    credential: bool,
    infrastructure: bool,
    queries: Vec<CloudQuery>,
}

/// Mock [`CloudState`] with fixed answers.
#[derive(Debug, Clone)]
pub struct MockCloudState {
    inner: Arc<Mutex<CloudInner>>,
}

impl MockCloudState {
    pub fn new(credential: bool, infrastructure: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CloudInner {
                credential,
                infrastructure,
                queries: Vec::new(),
            })),
        }
    }

    /// Authenticated and provisioned.
    pub fn configured() -> Self {
        Self::new(true, true)
    }

    /// Neither authenticated nor provisioned.
    pub fn unconfigured() -> Self {
        Self::new(false, false)
    }

    /// Number of queries made so far.
    pub fn queries(&self) -> usize {
        self.inner.lock().unwrap().queries.len()
    }

    /// Queries in call order.
    pub fn query_log(&self) -> Vec<CloudQuery> {
        self.inner.lock().unwrap().queries.clone()
    }
}

impl CloudState for MockCloudState {
    fn is_credential_configured(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(CloudQuery::Credential);
        inner.credential
    }

    fn is_core_infrastructure_deployed(&self, _settings: &Settings) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(CloudQuery::Infrastructure);
        inner.infrastructure
    }
}

#[derive(Debug, Default)]
struct EnvFilesInner {
    default: Option<PathBuf>,
    requests: Vec<Provider>,
}

/// Mock [`EnvFileResolver`].
///
/// The default instance has no env file and fails every request with
/// `CollabError::NotConfigured`.
#[derive(Debug, Clone, Default)]
pub struct MockEnvFiles {
    inner: Arc<Mutex<EnvFilesInner>>,
}

impl MockEnvFiles {
    /// Resolve every provider to `path`.
    pub fn with_default(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EnvFilesInner {
                default: Some(path.into()),
                requests: Vec::new(),
            })),
        }
    }

    /// Providers requested, in call order.
    pub fn requests(&self) -> Vec<Provider> {
        self.inner.lock().unwrap().requests.clone()
    }
}

impl EnvFileResolver for MockEnvFiles {
    fn resolve_default_env_file(
        &self,
        provider: Provider,
        _init_dir: &Path,
    ) -> Result<PathBuf, CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(provider);
        inner
            .default
            .clone()
            .ok_or_else(|| CollabError::NotConfigured(format!("no env file for {}", provider)))
    }
}

#[derive(Debug, Default)]
struct CatalogInner {
    modules: BTreeSet<String>,
    fail_with: Option<CollabError>,
    calls: usize,
}

/// Mock [`ModuleCatalog`].
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    inner: Arc<Mutex<CatalogInner>>,
}

impl MockCatalog {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Mutex::new(CatalogInner {
                modules: modules.into_iter().map(Into::into).collect(),
                ..Default::default()
            })),
        }
    }

    /// A catalog whose listing always fails.
    pub fn failing() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CatalogInner {
                fail_with: Some(CollabError::NotConfigured("catalog unavailable".into())),
                ..Default::default()
            })),
        }
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }
}

impl ModuleCatalog for MockCatalog {
    fn list_available_modules(&self) -> Result<BTreeSet<String>, CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        match &inner.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(inner.modules.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct SinkInner {
    received: Vec<ExecutionDescriptor>,
    fail_with: Option<CollabError>,
}

/// Mock [`BatchSubmitter`]. Job ids count up from `job-1`.
#[derive(Debug, Clone, Default)]
pub struct MockBatchSubmitter {
    inner: Arc<Mutex<SinkInner>>,
}

impl MockBatchSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: CollabError) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SinkInner {
                received: Vec::new(),
                fail_with: Some(error),
            })),
        }
    }

    /// Descriptors submitted so far.
    pub fn submitted(&self) -> Vec<ExecutionDescriptor> {
        self.inner.lock().unwrap().received.clone()
    }
}

impl BatchSubmitter for MockBatchSubmitter {
    fn submit(&self, descriptor: &ExecutionDescriptor) -> Result<JobInfo, CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner.received.push(descriptor.clone());
        if let Some(e) = &inner.fail_with {
            return Err(e.clone());
        }
        let n = inner.received.len();
        Ok(JobInfo {
            job_id: format!("job-{}", n),
            job_name: format!("{}-{}", descriptor.module.name, n),
        })
    }
}

/// Mock [`ContainerRunner`].
#[derive(Debug, Clone, Default)]
pub struct MockContainerRunner {
    inner: Arc<Mutex<SinkInner>>,
}

impl MockContainerRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: CollabError) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SinkInner {
                received: Vec::new(),
                fail_with: Some(error),
            })),
        }
    }

    /// Descriptors run so far.
    pub fn runs(&self) -> Vec<ExecutionDescriptor> {
        self.inner.lock().unwrap().received.clone()
    }
}

impl ContainerRunner for MockContainerRunner {
    fn run(&self, descriptor: &ExecutionDescriptor) -> Result<(), CollabError> {
        let mut inner = self.inner.lock().unwrap();
        inner.received.push(descriptor.clone());
        match &inner.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigFile;
    use crate::core::paths::BioshedPaths;

    #[test]
    fn cloud_state_records_queries() {
        let cloud = MockCloudState::new(true, false);
        let settings = Settings::new(BioshedPaths::new(PathBuf::from("/init")), ConfigFile::default());
        assert!(cloud.is_credential_configured());
        assert!(!cloud.is_core_infrastructure_deployed(&settings));
        assert_eq!(
            cloud.query_log(),
            vec![CloudQuery::Credential, CloudQuery::Infrastructure]
        );
    }

    #[test]
    fn clones_share_state() {
        let env_files = MockEnvFiles::with_default("/init/aws.env");
        let clone = env_files.clone();
        clone
            .resolve_default_env_file(Provider::Gcp, Path::new("/init"))
            .unwrap();
        assert_eq!(env_files.requests(), vec![Provider::Gcp]);
    }

    #[test]
    fn default_env_files_fail() {
        let err = MockEnvFiles::default()
            .resolve_default_env_file(Provider::Aws, Path::new("/init"))
            .unwrap_err();
        assert!(matches!(err, CollabError::NotConfigured(_)));
    }

    #[test]
    fn batch_job_ids_increment() {
        let batch = MockBatchSubmitter::new();
        let d = ExecutionDescriptor {
            mode: crate::core::types::ExecutionMode::CloudBatch,
            module: crate::core::types::ModuleReference::new("bwa"),
            args: vec![],
            mounts: Default::default(),
            env: None,
            sudo_user: None,
        };
        assert_eq!(batch.submit(&d).unwrap().job_id, "job-1");
        assert_eq!(batch.submit(&d).unwrap().job_name, "bwa-2");
    }

    #[test]
    fn catalog_counts_calls() {
        let catalog = MockCatalog::new(["a", "b"]);
        assert_eq!(catalog.list_available_modules().unwrap().len(), 2);
        assert_eq!(catalog.calls(), 1);
        assert!(MockCatalog::failing().list_available_modules().is_err());
    }
}
