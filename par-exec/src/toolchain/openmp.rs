use async_trait::async_trait;
use std::path::Path;
use tokio::time::Duration;

use super::{RunPlan, Toolchain};
use crate::{config::ExecConfig, types::Language};

/// Shared-memory thread parallelism: compile with `-fopenmp`, run the
/// binary directly, and pass the worker count through `OMP_NUM_THREADS`.
pub struct OpenMpToolchain;

#[async_trait]
impl Toolchain for OpenMpToolchain {
    fn compiler(&self, language: Language) -> &'static str {
        match language {
            Language::C => "gcc",
            Language::Cpp => "g++",
        }
    }

    fn compile_args(&self, language: Language, source: &Path, binary: &Path) -> Vec<String> {
        let mut args = vec![
            "-fopenmp".to_string(),
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
            program: binary.display().to_string(),
            args: Vec::new(),
            env: vec![("OMP_NUM_THREADS".to_string(), workers.to_string())],
        }
    }

    fn exec_timeout(&self, config: &ExecConfig) -> Duration {
        config.exec_timeout
    }

    fn max_workers(&self, config: &ExecConfig) -> u32 {
        config.max_threads
    }

    fn required_tools(&self) -> Vec<&'static str> {
        vec!["gcc", "g++"]
    }
}
