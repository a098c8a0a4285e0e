//! Maps raw process outcomes into the caller-facing classification.
//!
//! Pure with respect to outcomes already collected: no I/O happens here,
//! which is what makes the precedence rules table-testable.

use crate::types::{CompileOutcome, Phase, ProcessOutcome, TerminationReason};

/// Terminal outcome of the compile step, or `None` when compilation
/// succeeded and execution may proceed.
pub fn normalize_compile(compile: &ProcessOutcome) -> Option<CompileOutcome> {
    match compile.termination {
        TerminationReason::TimedOut => Some(CompileOutcome::Timeout {
            phase: Phase::Compile,
        }),
        // A killed or failing compiler surfaces its diagnostics verbatim;
        // any partial binary on disk is never trusted.
        TerminationReason::Killed => Some(CompileOutcome::CompileError {
            diagnostics: compile.stderr.clone(),
        }),
        TerminationReason::Completed if compile.exit_code != Some(0) => {
            Some(CompileOutcome::CompileError {
                diagnostics: compile.stderr.clone(),
            })
        }
        TerminationReason::Completed => None,
    }
}

/// Classification of the run step, reached only after a clean compile.
pub fn normalize_run(run: &ProcessOutcome) -> CompileOutcome {
    match run.termination {
        TerminationReason::TimedOut => CompileOutcome::Timeout {
            phase: Phase::Execute,
        },
        TerminationReason::Killed => CompileOutcome::RuntimeError {
            diagnostics: run.stderr.clone(),
            stdout: run.stdout.clone(),
            exit_code: run.exit_code,
        },
        TerminationReason::Completed => match run.exit_code {
            Some(0) => CompileOutcome::Success {
                stdout: run.stdout.clone(),
                stderr: run.stderr.clone(),
                exit_code: 0,
            },
            code => CompileOutcome::RuntimeError {
                diagnostics: run.stderr.clone(),
                stdout: run.stdout.clone(),
                exit_code: code,
            },
        },
    }
}

/// Combined normalization with the full precedence order: compile-step
/// terminals short-circuit before the run outcome is consulted.
pub fn normalize(compile: &ProcessOutcome, run: Option<&ProcessOutcome>) -> CompileOutcome {
    if let Some(terminal) = normalize_compile(compile) {
        return terminal;
    }
    match run {
        Some(run) => normalize_run(run),
        // A clean compile with no recorded run outcome cannot come out of
        // the pipeline; classify it as a runtime failure rather than lie
        // about success.
        None => CompileOutcome::RuntimeError {
            diagnostics: "program was never executed".to_string(),
            stdout: String::new(),
            exit_code: None,
        },
    }
}
