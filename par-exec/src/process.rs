use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{self, Duration};
use tracing::{debug, warn};

use crate::{
    error::Error,
    types::{ProcessOutcome, TerminationReason},
    Result,
};

/// Marker appended when captured output hit the configured cap.
pub const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Run one child process under supervision: its own session (so the whole
/// process group can be killed), a hard timeout, and bounded capture of
/// both standard streams.
///
/// On timeout the entire process group receives SIGKILL, not just the
/// immediate child; parallel runtimes spawn workers that must not outlive
/// the request.
pub async fn supervise(
    program: &str,
    args: &[String],
    env: &[(String, String)],
    cwd: &Path,
    timeout: Duration,
    max_output: usize,
) -> Result<ProcessOutcome> {
    let program_path = resolve(program)?;

    let mut command = Command::new(&program_path);
    command
        .args(args)
        .env_clear()
        .env("PATH", "/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin")
        .env("HOME", cwd)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // New session: the child becomes its own process-group leader, so a
    // later killpg(child_pid) reaches every worker it spawns.
    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid().map_err(|e| {
                std::io::Error::new(std::io::ErrorKind::Other, format!("setsid failed: {}", e))
            })?;
            Ok(())
        });
    }

    let start = Instant::now();
    let mut child = command.spawn().map_err(|source| Error::Spawn {
        command: program.to_string(),
        source,
    })?;
    let child_pid = child.id();
    debug!(program, pid = ?child_pid, "child spawned");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::System("child stdout was not piped".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::System("child stderr was not piped".to_string()))?;
    let stdout_task = tokio::spawn(read_capped(stdout, max_output));
    let stderr_task = tokio::spawn(read_capped(stderr, max_output));

    let (exit_code, termination) = match time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => (status.code(), classify(status)),
        Ok(Err(e)) => {
            kill_group(child_pid);
            return Err(Error::System(format!("failed waiting for child: {}", e)));
        }
        Err(_) => {
            warn!(program, pid = ?child_pid, timeout_secs = timeout.as_secs(), "timeout, killing process group");
            kill_group(child_pid);
            // Reap so the group kill cannot leave a zombie behind.
            let _ = child.wait().await;
            (None, TerminationReason::TimedOut)
        }
    };

    let stdout = stdout_task
        .await
        .map_err(|e| Error::System(format!("stdout reader failed: {}", e)))?;
    let stderr = stderr_task
        .await
        .map_err(|e| Error::System(format!("stderr reader failed: {}", e)))?;

    Ok(ProcessOutcome {
        exit_code,
        stdout,
        stderr,
        elapsed: start.elapsed(),
        termination,
    })
}

/// Resolve a command name to an executable path. Paths with a directory
/// component (`./program`, absolute artifact paths) are used as-is.
fn resolve(program: &str) -> Result<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return Ok(candidate.to_path_buf());
    }
    which::which(program).map_err(|_| Error::System(format!("command not found: {}", program)))
}

fn classify(status: std::process::ExitStatus) -> TerminationReason {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal().is_some() {
            return TerminationReason::Killed;
        }
    }
    TerminationReason::Completed
}

/// SIGKILL the whole process group rooted at `pid`. `setsid` in `pre_exec`
/// made the child a group leader, so its pgid equals its pid.
fn kill_group(pid: Option<u32>) {
    let Some(pid) = pid else { return };
    if let Err(e) = signal::killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        // ESRCH just means the group already exited.
        if e != nix::errno::Errno::ESRCH {
            warn!(pid, "failed to kill process group: {}", e);
        }
    }
}

/// Read a stream to EOF, keeping at most `cap` bytes. The remainder is
/// drained and discarded so a flooding child never blocks on a full pipe,
/// and a marker records that truncation happened.
async fn read_capped<R: tokio::io::AsyncRead + Unpin>(mut reader: R, cap: usize) -> String {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if kept.len() < cap {
                    let take = n.min(cap - kept.len());
                    kept.extend_from_slice(&chunk[..take]);
                    if take < n {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
            Err(_) => break,
        }
    }

    let mut text = String::from_utf8_lossy(&kept).into_owned();
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }
    text
}
