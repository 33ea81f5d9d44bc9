//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing and formatting
//! - [`help`] - Help and listing texts

pub mod help;
pub mod output;
