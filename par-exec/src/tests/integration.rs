//! End-to-end pipeline tests. Tests that invoke a real compiler skip
//! cleanly when the toolchain is not installed on the host.

use super::fixtures::*;
use crate::{
    CompileOutcome, CompileRequest, CompileService, Language, Phase, Pipeline, Result,
    ToolchainMode,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn openmp_request(code: &str, workers: u32) -> CompileRequest {
    CompileRequest {
        code: code.to_string(),
        mode: ToolchainMode::ThreadParallel,
        language: Language::C,
        workers,
    }
}

fn scratch_entries(path: &std::path::Path) -> usize {
    std::fs::read_dir(path).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn array_sum_succeeds_with_four_threads() -> Result<()> {
    if !gcc_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let service = CompileService::new(1, test_config(scratch.path())).await?;

    let outcome = service.execute(openmp_request(ARRAY_SUM, 4)).await?;
    match outcome {
        CompileOutcome::Success {
            stdout, exit_code, ..
        } => {
            assert!(stdout.contains("Sum: 55"), "stdout was: {}", stdout);
            assert_eq!(exit_code, 0);
        }
        other => panic!("expected success, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn syntax_error_surfaces_compiler_diagnostics_verbatim() -> Result<()> {
    if !gcc_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let service = CompileService::new(1, test_config(scratch.path())).await?;

    let outcome = service.execute(openmp_request(SYNTAX_ERROR, 2)).await?;
    match outcome {
        CompileOutcome::CompileError { diagnostics } => {
            // gcc prints `program.c:<line>:<col>: error: ...` and the
            // pipeline must not reformat it.
            assert!(diagnostics.contains("program.c:"), "{}", diagnostics);
            assert!(diagnostics.contains("error"), "{}", diagnostics);
        }
        other => panic!("expected compile error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn runtime_failure_keeps_partial_output_and_exit_code() -> Result<()> {
    if !gcc_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let service = CompileService::new(1, test_config(scratch.path())).await?;

    let outcome = service.execute(openmp_request(FAILING_PROGRAM, 2)).await?;
    match outcome {
        CompileOutcome::RuntimeError {
            diagnostics,
            stdout,
            exit_code,
        } => {
            assert!(stdout.contains("got this far"));
            assert!(diagnostics.contains("giving up"));
            assert_eq!(exit_code, Some(7));
        }
        other => panic!("expected runtime error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn infinite_loop_times_out_and_leaves_no_workers() -> Result<()> {
    if !gcc_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let pipeline = Pipeline::new(Arc::new(short_timeout_config(scratch.path())))?;

    let started = Instant::now();
    let outcome = pipeline
        .compile_and_run(&openmp_request(INFINITE_LOOP, 4))
        .await?;
    let elapsed = started.elapsed();

    assert_eq!(
        outcome,
        CompileOutcome::Timeout {
            phase: Phase::Execute
        }
    );
    // Within a bounded margin of the 2s execution timeout, plus
    // compilation time.
    assert!(elapsed < Duration::from_secs(15), "took {:?}", elapsed);

    // The workspace (and with it the binary the group was running from)
    // is gone; nothing leaks across the timeout path.
    assert_eq!(pipeline.live_workspaces(), 0);
    assert_eq!(scratch_entries(scratch.path()), 0);
    Ok(())
}

#[tokio::test]
async fn workspace_released_exactly_once_on_every_terminal_path() -> Result<()> {
    if !gcc_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let pipeline = Pipeline::new(Arc::new(test_config(scratch.path())))?;

    for code in [ARRAY_SUM, SYNTAX_ERROR, FAILING_PROGRAM] {
        pipeline.compile_and_run(&openmp_request(code, 2)).await?;
        assert_eq!(pipeline.live_workspaces(), 0);
        assert_eq!(scratch_entries(scratch.path()), 0);
    }
    Ok(())
}

#[tokio::test]
async fn identical_concurrent_requests_do_not_interfere() -> Result<()> {
    if !gcc_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let service = CompileService::new(2, test_config(scratch.path())).await?;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.execute(openmp_request(ARRAY_SUM, 4)).await
        }));
    }

    for handle in handles {
        let outcome = handle.await.unwrap()?;
        match outcome {
            CompileOutcome::Success { stdout, .. } => assert!(stdout.contains("Sum: 55")),
            other => panic!("expected success, got {:?}", other),
        }
    }
    assert_eq!(scratch_entries(scratch.path()), 0);
    Ok(())
}

#[tokio::test]
async fn screener_rejection_names_the_pattern() -> Result<()> {
    let scratch = tempdir().unwrap();
    let service = CompileService::new(1, test_config(scratch.path())).await?;

    let outcome = service.execute(openmp_request(FORBIDDEN_SYSTEM, 2)).await?;
    match outcome {
        CompileOutcome::Rejected { reason } => assert!(reason.contains("system")),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(scratch_entries(scratch.path()), 0);
    Ok(())
}

#[tokio::test]
async fn mpi_hello_runs_across_ranks() -> Result<()> {
    if !mpi_available() {
        return Ok(());
    }
    let scratch = tempdir().unwrap();
    let service = CompileService::new(1, test_config(scratch.path())).await?;

    let outcome = service
        .execute(CompileRequest {
            code: MPI_HELLO.to_string(),
            mode: ToolchainMode::ProcessParallel,
            language: Language::C,
            workers: 2,
        })
        .await?;

    match outcome {
        CompileOutcome::Success { stdout, .. } => {
            assert!(stdout.contains("Hello from rank"));
            assert!(stdout.contains("of 2"));
        }
        other => panic!("expected success, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn process_parallel_worker_ceiling_is_lower() -> Result<()> {
    let scratch = tempdir().unwrap();
    let service = CompileService::new(1, test_config(scratch.path())).await?;

    // 12 workers are fine for threads but over the process ceiling of 8.
    let outcome = service
        .execute(CompileRequest {
            code: MPI_HELLO.to_string(),
            mode: ToolchainMode::ProcessParallel,
            language: Language::C,
            workers: 12,
        })
        .await?;
    assert_eq!(outcome.label(), "rejected");
    Ok(())
}
