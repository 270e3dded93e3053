//! CLI-layer glue: repository discovery, graph assembly, the build
//! orchestrator, and the atomic staging/commit step. `canopy-core`,
//! `canopy-indexer`, and `canopy-ai` hold the reusable engine; this crate
//! wires them together behind the `canopy` binary.

pub mod commands;
pub mod error;
pub mod graph_builder;
pub mod orchestrator;
pub mod staging;
pub mod walk;

pub use error::{BuildFailure, CommitError};
pub use orchestrator::{run_build, BuildReport, Progress};
