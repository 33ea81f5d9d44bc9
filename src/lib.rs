//! bioshed - run bioinformatics modules as cloud batch jobs or local containers
//!
//! bioshed turns a command line such as `bioshed run fastqc -h` into an
//! execution descriptor (mode, module image, arguments, mounts, env file)
//! and hands it to exactly one sink: a cloud batch submitter or a local
//! container runner.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Resolution pipeline: normalize, target, module, mounts, descriptor
//! - [`core`] - Domain types, paths, and configuration
//! - [`collab`] - Cloud state, module catalog, and the two sinks
//! - [`ui`] - User-facing output
//!
//! # Invariants
//!
//! 1. Descriptor args never contain a token consumed as a dispatcher option
//! 2. Biocontainers always run as local containers
//! 3. Usage errors are raised before any collaborator is consulted
//! 4. Resolution is idempotent: re-resolving a rewritten stream changes nothing

pub mod cli;
pub mod collab;
pub mod core;
pub mod engine;
pub mod ui;
