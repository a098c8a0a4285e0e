use async_trait::async_trait;
use std::path::Path;
use tokio::time::Duration;

use super::{RunPlan, Toolchain};
use crate::{config::ExecConfig, types::Language};

/// Message-passing parallelism over OS processes: compile with the MPI
/// wrapper compilers and launch through `mpirun -np <workers>`. Single
/// node only; rank spawning is why this mode gets a longer exec timeout.
pub struct MpiToolchain;

#[async_trait]
impl Toolchain for MpiToolchain {
    fn compiler(&self, language: Language) -> &'static str {
        match language {
            Language::C => "mpicc",
            Language::Cpp => "mpicxx",
        }
    }

    fn compile_args(&self, language: Language, source: &Path, binary: &Path) -> Vec<String> {
        let mut args = vec![
            source.display().to_string(),
            "-o".to_string(),
            binary.display().to_string(),
            "-lm".to_string(),
        ];
        if language == Language::Cpp {
            args.push("-std=c++17".to_string());
            args.push("-pedantic".to_string());
        }
        args
    }

    fn run_plan(&self, binary: &Path, workers: u32) -> RunPlan {
        RunPlan {
            program: "mpirun".to_string(),
            args: vec![
                "--allow-run-as-root".to_string(),
                "--oversubscribe".to_string(),
                "-np".to_string(),
                workers.to_string(),
                binary.display().to_string(),
            ],
            // Open MPI refuses to run as root without explicit consent;
            // containerized deployments commonly are root.
            env: vec![
                ("OMPI_ALLOW_RUN_AS_ROOT".to_string(), "1".to_string()),
                (
                    "OMPI_ALLOW_RUN_AS_ROOT_CONFIRM".to_string(),
                    "1".to_string(),
                ),
            ],
        }
    }

    fn exec_timeout(&self, config: &ExecConfig) -> Duration {
        config.mpi_exec_timeout
    }

    fn max_workers(&self, config: &ExecConfig) -> u32 {
        config.max_processes
    }

    fn required_tools(&self) -> Vec<&'static str> {
        vec!["mpicc", "mpicxx", "mpirun"]
    }
}
