//! core
//!
//! Core domain types, configuration, and storage paths for bioshed.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ModuleReference, MountBinding, ExecutionDescriptor, etc.
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for the init directory
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Configuration is an explicit value, never process-wide state

pub mod config;
pub mod paths;
pub mod types;
