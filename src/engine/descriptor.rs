//! engine::descriptor
//!
//! Final assembly of the execution descriptor.
//!
//! # Example
//!
//! ```
//! use bioshed::core::types::{ExecutionMode, ModuleReference};
//! use bioshed::engine::descriptor::DescriptorBuilder;
//!
//! let descriptor = DescriptorBuilder::new(ExecutionMode::LocalContainer)
//!     .module(ModuleReference::new("fastqc"))
//!     .args(vec!["-h".to_string()])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.module.name, "fastqc");
//! assert!(descriptor.mounts.is_empty());
//! ```

use std::collections::BTreeSet;

use crate::core::types::{EnvSource, ExecutionDescriptor, ExecutionMode, ModuleReference, MountBinding};

use super::UsageError;

/// Builder for [`ExecutionDescriptor`]. Performs no I/O.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    mode: ExecutionMode,
    module: Option<ModuleReference>,
    args: Vec<String>,
    mounts: BTreeSet<MountBinding>,
    env: Option<EnvSource>,
    sudo_user: Option<String>,
}

impl DescriptorBuilder {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            module: None,
            args: Vec::new(),
            mounts: BTreeSet::new(),
            env: None,
            sudo_user: None,
        }
    }

    pub fn module(mut self, module: ModuleReference) -> Self {
        self.module = Some(module);
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn mounts(mut self, mounts: BTreeSet<MountBinding>) -> Self {
        self.mounts = mounts;
        self
    }

    pub fn env(mut self, env: Option<EnvSource>) -> Self {
        self.env = env;
        self
    }

    pub fn sudo_user(mut self, user: Option<String>) -> Self {
        self.sudo_user = user;
        self
    }

    /// Assemble the descriptor.
    ///
    /// # Errors
    ///
    /// `UsageError::MissingModule` if no module was set.
    pub fn build(self) -> Result<ExecutionDescriptor, UsageError> {
        let module = self.module.ok_or(UsageError::MissingModule)?;
        Ok(ExecutionDescriptor {
            mode: self.mode,
            module,
            args: self.args,
            mounts: self.mounts,
            env: self.env,
            sudo_user: self.sudo_user,
        })
    }
}
