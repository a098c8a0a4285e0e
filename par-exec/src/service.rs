use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::{
    config::ExecConfig,
    error::Error,
    pipeline::Pipeline,
    samples::{sample_programs, SampleProgram},
    toolchain::{self, ToolchainHealth},
    types::{CompileOutcome, CompileRequest},
    Result,
};

/// Age at which an orphaned workspace from a previous run is swept.
const STALE_WORKSPACE_AGE: Duration = Duration::from_secs(3600);

/// Facade over the pipeline: bounds concurrent executions with a
/// semaphore and exposes the health probe and sample catalog consumed by
/// the HTTP layer.
#[derive(Clone)]
pub struct CompileService {
    pipeline: Arc<Pipeline>,
    semaphore: Arc<Semaphore>,
}

impl CompileService {
    pub async fn new(max_concurrent_executions: usize, config: ExecConfig) -> Result<Self> {
        let pipeline = Pipeline::new(Arc::new(config))?;

        // Best effort: leftovers from a crashed previous process.
        match pipeline.sweep_stale(STALE_WORKSPACE_AGE).await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "swept stale workspaces"),
            Err(e) => warn!("stale workspace sweep failed: {}", e),
        }

        Ok(Self {
            pipeline: Arc::new(pipeline),
            semaphore: Arc::new(Semaphore::new(max_concurrent_executions)),
        })
    }

    /// Compile and run one request. Concurrent callers beyond the
    /// configured limit wait for a slot; there is no retry policy.
    pub async fn execute(&self, request: CompileRequest) -> Result<CompileOutcome> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::System(format!("failed to acquire execution slot: {}", e)))?;

        debug!(mode = ?request.mode, workers = request.workers, "starting compile-and-run");

        let result = self.pipeline.compile_and_run(&request).await;
        match &result {
            Ok(outcome) => info!(status = outcome.label(), "request finished"),
            Err(e) => error!("request failed: {}", e),
        }
        result
    }

    /// Probe the host for the compilers and launchers both modes need.
    pub async fn health(&self) -> ToolchainHealth {
        toolchain::probe_health().await
    }

    /// Static example programs for the editor frontend.
    pub fn sample_programs(&self) -> &'static [SampleProgram] {
        sample_programs()
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}
