//! # Parallel Code Execution Pipeline
//!
//! Compiles untrusted C/C++ source with a parallel-programming toolchain
//! (OpenMP for shared-memory threads, MPI for message-passing processes),
//! runs the resulting binary under a timeout with the whole process group
//! supervised, and returns captured output as a structured outcome.
//!
//! The pipeline for one request: deny-list screening, per-request scratch
//! workspace, compiler invocation, supervised execution, outcome
//! normalization. Workspaces are released on every exit path.

mod config;
mod error;
mod outcome;
mod pipeline;
mod process;
mod samples;
mod screen;
mod service;
mod toolchain;
mod types;
mod workspace;

#[cfg(test)]
mod tests;

pub use config::ExecConfig;
pub use error::Error;
pub use outcome::normalize;
pub use pipeline::Pipeline;
pub use samples::{sample_programs, SampleProgram};
pub use screen::Screener;
pub use service::CompileService;
pub use toolchain::{probe_health, ToolProbe, Toolchain, ToolchainHealth};
pub use types::{
    CompileOutcome, CompileRequest, Language, Phase, ProcessOutcome, ScreenResult,
    TerminationReason, ToolchainMode,
};
pub use workspace::{Workspace, WorkspaceManager};

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
