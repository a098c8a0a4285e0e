//! Toolchain selection: how each parallel mode compiles and launches a
//! program, and whether its compilers are present on the host.

mod mpi;
mod openmp;

pub use mpi::MpiToolchain;
pub use openmp::OpenMpToolchain;

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tokio::process::Command;
use tokio::time::{self, Duration};
use which::which;

use crate::{
    config::ExecConfig,
    error::Error,
    types::{Language, ToolchainMode},
    Result,
};

/// How to launch a compiled artifact: the command, its arguments, and the
/// environment that carries the worker count to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// A parallel-programming toolchain. Implementations only build command
/// lines and probe for tools; spawning and supervision live in the
/// process module.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Compiler executable for the given source language.
    fn compiler(&self, language: Language) -> &'static str;

    /// Arguments for compiling `source` into `binary`.
    fn compile_args(&self, language: Language, source: &Path, binary: &Path) -> Vec<String>;

    /// Launch convention for the compiled binary with `workers` workers.
    /// The worker count is already validated against [`max_workers`];
    /// whatever the program requests at runtime does not widen it.
    ///
    /// [`max_workers`]: Toolchain::max_workers
    fn run_plan(&self, binary: &Path, workers: u32) -> RunPlan;

    /// Execution timeout for this mode.
    fn exec_timeout(&self, config: &ExecConfig) -> Duration;

    /// Worker-count ceiling for this mode.
    fn max_workers(&self, config: &ExecConfig) -> u32;

    /// Executables this toolchain needs on the host.
    fn required_tools(&self) -> Vec<&'static str>;

    /// Fail if any required tool is missing from PATH.
    async fn check_tools(&self) -> Result<()> {
        let missing: Vec<_> = self
            .required_tools()
            .iter()
            .filter(|tool| which(tool).is_err())
            .map(|s| (*s).to_string())
            .collect();

        if !missing.is_empty() {
            return Err(Error::System(format!(
                "missing required tools: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Toolchain for a request's mode. The implementations are stateless, so
/// static instances are shared across all requests.
pub fn for_mode(mode: ToolchainMode) -> &'static dyn Toolchain {
    match mode {
        ToolchainMode::ThreadParallel => &OpenMpToolchain,
        ToolchainMode::ProcessParallel => &MpiToolchain,
    }
}

/// Availability and version of one host tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolProbe {
    pub name: &'static str,
    pub available: bool,
    pub version: Option<String>,
}

/// Host toolchain health, consumed by the caller's health-check endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolchainHealth {
    pub openmp_available: bool,
    pub mpi_available: bool,
    pub tools: Vec<ToolProbe>,
}

/// Probe every compiler/launcher the two modes rely on. Absent tools are
/// reported, never retried or installed.
pub async fn probe_health() -> ToolchainHealth {
    let openmp = for_mode(ToolchainMode::ThreadParallel);
    let mpi = for_mode(ToolchainMode::ProcessParallel);

    let mut names = openmp.required_tools();
    for tool in mpi.required_tools() {
        if !names.contains(&tool) {
            names.push(tool);
        }
    }

    let mut tools = Vec::new();
    for name in names {
        tools.push(probe_tool(name).await);
    }

    let all_available = |toolchain: &dyn Toolchain| {
        toolchain
            .required_tools()
            .iter()
            .all(|name| tools.iter().any(|t| t.name == *name && t.available))
    };
    let openmp_available = all_available(openmp);
    let mpi_available = all_available(mpi);

    ToolchainHealth {
        openmp_available,
        mpi_available,
        tools,
    }
}

async fn probe_tool(name: &'static str) -> ToolProbe {
    if which(name).is_err() {
        return ToolProbe {
            name,
            available: false,
            version: None,
        };
    }

    let output = time::timeout(
        Duration::from_secs(5),
        Command::new(name).arg("--version").output(),
    )
    .await;

    match output {
        Ok(Ok(out)) if out.status.success() => {
            let first_line = String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            ToolProbe {
                name,
                available: true,
                version: Some(first_line),
            }
        }
        _ => ToolProbe {
            name,
            available: false,
            version: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_dispatch_matches_required_tools() {
        let openmp = for_mode(ToolchainMode::ThreadParallel);
        assert!(openmp.required_tools().contains(&"gcc"));

        let mpi = for_mode(ToolchainMode::ProcessParallel);
        assert!(mpi.required_tools().contains(&"mpirun"));
    }

    #[tokio::test]
    async fn probe_reports_every_required_tool() {
        let health = probe_health().await;
        // Union of both modes' requirements: gcc, g++, mpicc, mpicxx, mpirun.
        assert_eq!(health.tools.len(), 5);
        for probe in &health.tools {
            if probe.available {
                assert!(probe.version.is_some());
            }
        }
    }

    struct BrokenToolchain;

    #[async_trait]
    impl Toolchain for BrokenToolchain {
        fn compiler(&self, _language: Language) -> &'static str {
            "par-exec-test-missing-compiler"
        }

        fn compile_args(&self, _language: Language, _source: &Path, _binary: &Path) -> Vec<String> {
            Vec::new()
        }

        fn run_plan(&self, binary: &Path, _workers: u32) -> RunPlan {
            RunPlan {
                program: binary.display().to_string(),
                args: Vec::new(),
                env: Vec::new(),
            }
        }

        fn exec_timeout(&self, config: &ExecConfig) -> Duration {
            config.exec_timeout
        }

        fn max_workers(&self, config: &ExecConfig) -> u32 {
            config.max_threads
        }

        fn required_tools(&self) -> Vec<&'static str> {
            vec!["par-exec-test-missing-compiler"]
        }
    }

    #[tokio::test]
    async fn check_tools_names_the_missing_executable() {
        let err = BrokenToolchain.check_tools().await.unwrap_err();
        assert!(err
            .to_string()
            .contains("par-exec-test-missing-compiler"));
    }

    #[tokio::test]
    async fn check_tools_passes_when_toolchain_is_installed() {
        if which("gcc").is_err() || which("g++").is_err() {
            return;
        }
        OpenMpToolchain.check_tools().await.unwrap();
    }
}
