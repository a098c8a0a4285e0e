use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Parallel toolchain selected by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolchainMode {
    /// Shared-memory threads within one process (OpenMP).
    ThreadParallel,
    /// Cooperating OS processes exchanging messages (MPI), single-node.
    ProcessParallel,
}

impl FromStr for ToolchainMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openmp" | "thread-parallel" => Ok(ToolchainMode::ThreadParallel),
            "mpi" | "process-parallel" => Ok(ToolchainMode::ProcessParallel),
            _ => Err(format!("unsupported mode: {}", s)),
        }
    }
}

/// Source language of the submitted program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    C,
    Cpp,
}

impl Language {
    /// File name the source is written under inside the workspace.
    pub fn source_file_name(&self) -> &'static str {
        match self {
            Language::C => "program.c",
            Language::Cpp => "program.cpp",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            _ => Err(format!("unsupported language: {}", s)),
        }
    }
}

/// One compile-and-run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Source code to compile and execute
    pub code: String,
    /// Toolchain mode
    pub mode: ToolchainMode,
    /// Source language
    #[serde(default)]
    pub language: Language,
    /// Requested worker count (threads or ranks, depending on mode)
    pub workers: u32,
}

/// Why a supervised child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationReason {
    /// Exited on its own, successfully or not
    Completed,
    /// Forcibly killed after the configured timeout expired
    TimedOut,
    /// Terminated by a signal we did not send
    Killed,
}

/// Captured result of one supervised child process, produced once for the
/// compile step and once for the run step, never shared between them.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Exit code if the process exited normally
    pub exit_code: Option<i32>,
    /// Captured stdout, truncated at the configured cap
    pub stdout: String,
    /// Captured stderr, truncated at the configured cap
    pub stderr: String,
    /// Wall-clock time the process was alive
    pub elapsed: Duration,
    /// How the process ended
    pub termination: TerminationReason,
}

impl ProcessOutcome {
    /// True when the process ran to completion with exit code zero.
    pub fn succeeded(&self) -> bool {
        self.termination == TerminationReason::Completed && self.exit_code == Some(0)
    }
}

/// Pipeline phase a timeout occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Compile,
    Execute,
}

/// Verdict of the deny-list screener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenResult {
    /// First deny-list pattern the source matched, if any
    pub matched: Option<String>,
}

impl ScreenResult {
    pub fn is_clean(&self) -> bool {
        self.matched.is_none()
    }
}

/// Terminal classification of a request, returned to the caller.
///
/// Diagnostics are passed through byte-for-byte so compiler line/column
/// references stay meaningful to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CompileOutcome {
    Success {
        stdout: String,
        stderr: String,
        exit_code: i32,
    },
    CompileError {
        diagnostics: String,
    },
    RuntimeError {
        diagnostics: String,
        stdout: String,
        exit_code: Option<i32>,
    },
    Timeout {
        phase: Phase,
    },
    Rejected {
        reason: String,
    },
}

impl CompileOutcome {
    /// Short classification label, used for logging.
    pub fn label(&self) -> &'static str {
        match self {
            CompileOutcome::Success { .. } => "success",
            CompileOutcome::CompileError { .. } => "compile-error",
            CompileOutcome::RuntimeError { .. } => "runtime-error",
            CompileOutcome::Timeout { .. } => "timeout",
            CompileOutcome::Rejected { .. } => "rejected",
        }
    }
}
