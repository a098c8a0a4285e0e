use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::{
    config::ExecConfig,
    outcome,
    process,
    screen::Screener,
    toolchain::{self, Toolchain},
    types::{CompileOutcome, CompileRequest, ProcessOutcome},
    workspace::{Workspace, WorkspaceManager},
    Result,
};

/// Per-request compile-and-run pipeline.
///
/// One request moves strictly through screening, compilation, and
/// execution inside its own workspace; concurrent requests share nothing
/// but the immutable configuration and screener.
pub struct Pipeline {
    config: Arc<ExecConfig>,
    screener: Screener,
    workspaces: WorkspaceManager,
}

impl Pipeline {
    pub fn new(config: Arc<ExecConfig>) -> Result<Self> {
        let screener = Screener::new(&config.deny_patterns)?;
        let workspaces = WorkspaceManager::new(&config.scratch_root);
        Ok(Self {
            config,
            screener,
            workspaces,
        })
    }

    /// The single entry point: screen, compile, run, normalize.
    ///
    /// Every outcome attributable to the submitted code comes back as a
    /// [`CompileOutcome`]; `Err` is reserved for host-level failures such
    /// as scratch-space exhaustion. Validation and screening happen before
    /// any filesystem or process work, and the workspace is released on
    /// every path out of this function.
    pub async fn compile_and_run(&self, request: &CompileRequest) -> Result<CompileOutcome> {
        if let Some(rejection) = self.validate(request) {
            return Ok(rejection);
        }

        let verdict = self.screener.screen(&request.code);
        if let Some(pattern) = verdict.matched {
            debug!(%pattern, "source rejected by screener");
            return Ok(CompileOutcome::Rejected {
                reason: format!("forbidden construct matched deny-list pattern `{}`", pattern),
            });
        }

        // A host without the mode's compilers is a host-level error, caught
        // before any scratch space is touched.
        let toolchain = toolchain::for_mode(request.mode);
        toolchain.check_tools().await?;

        let mut workspace = self.workspaces.acquire().await?;
        // Drop on `workspace` guarantees release if this errors or panics.
        let result = self.run_stages(toolchain, &workspace, request).await;
        workspace.release().await;
        result
    }

    /// Workspaces acquired but not yet released. Steady state is zero.
    pub fn live_workspaces(&self) -> usize {
        self.workspaces.live_count()
    }

    /// Clear leftover workspaces from earlier runs.
    pub async fn sweep_stale(&self, max_age: Duration) -> Result<usize> {
        self.workspaces.sweep_stale(max_age).await
    }

    fn validate(&self, request: &CompileRequest) -> Option<CompileOutcome> {
        let reject = |reason: String| Some(CompileOutcome::Rejected { reason });

        if request.code.trim().is_empty() {
            return reject("empty source".to_string());
        }
        if request.code.len() > self.config.max_source_bytes {
            return reject(format!(
                "source exceeds {} bytes",
                self.config.max_source_bytes
            ));
        }

        let ceiling = toolchain::for_mode(request.mode).max_workers(&self.config);
        if request.workers == 0 || request.workers > ceiling {
            return reject(format!(
                "worker count {} outside allowed range 1..={}",
                request.workers, ceiling
            ));
        }
        None
    }

    async fn run_stages(
        &self,
        toolchain: &dyn Toolchain,
        workspace: &Workspace,
        request: &CompileRequest,
    ) -> Result<CompileOutcome> {
        let compile = self.compile(toolchain, workspace, request).await?;
        debug!(
            exit_code = ?compile.exit_code,
            elapsed_ms = compile.elapsed.as_millis() as u64,
            "compile step finished"
        );
        if let Some(terminal) = outcome::normalize_compile(&compile) {
            return Ok(terminal);
        }

        // Execution starts only after the compiler process has fully
        // terminated and its outcome has been captured.
        let run = self.execute(toolchain, workspace, request).await?;
        debug!(
            exit_code = ?run.exit_code,
            elapsed_ms = run.elapsed.as_millis() as u64,
            "run step finished"
        );
        Ok(outcome::normalize_run(&run))
    }

    async fn compile(
        &self,
        toolchain: &dyn Toolchain,
        workspace: &Workspace,
        request: &CompileRequest,
    ) -> Result<ProcessOutcome> {
        let source = workspace.source_path(request.language);
        fs::write(&source, &request.code).await?;

        let binary = workspace.binary_path();
        let compiler = toolchain.compiler(request.language);
        let args = toolchain.compile_args(request.language, &source, &binary);

        process::supervise(
            compiler,
            &args,
            &[],
            workspace.path(),
            self.config.compile_timeout,
            self.config.max_output_bytes,
        )
        .await
    }

    async fn execute(
        &self,
        toolchain: &dyn Toolchain,
        workspace: &Workspace,
        request: &CompileRequest,
    ) -> Result<ProcessOutcome> {
        let plan = toolchain.run_plan(&workspace.binary_path(), request.workers);
        process::supervise(
            &plan.program,
            &plan.args,
            &plan.env,
            workspace.path(),
            toolchain.exec_timeout(&self.config),
            self.config.max_output_bytes,
        )
        .await
    }
}
