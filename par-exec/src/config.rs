use std::path::PathBuf;
use std::time::Duration;

/// Configuration consumed by the pipeline. All knobs are externally
/// supplied; the pipeline keeps no persisted state of its own.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Directory workspaces are created under
    pub scratch_root: PathBuf,
    /// Timeout for the compiler invocation
    pub compile_timeout: Duration,
    /// Timeout for running the compiled binary (thread-parallel)
    pub exec_timeout: Duration,
    /// Timeout for running under mpirun, which needs extra time to spawn ranks
    pub mpi_exec_timeout: Duration,
    /// Worker-count ceiling for thread-parallel mode
    pub max_threads: u32,
    /// Worker-count ceiling for process-parallel mode
    pub max_processes: u32,
    /// Cap on captured stdout/stderr, each; excess is truncated with a marker
    pub max_output_bytes: usize,
    /// Cap on submitted source size
    pub max_source_bytes: usize,
    /// Deny-list patterns the screener compiles into a single set
    pub deny_patterns: Vec<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir().join("par-exec"),
            compile_timeout: Duration::from_secs(10),
            exec_timeout: Duration::from_secs(10),
            mpi_exec_timeout: Duration::from_secs(30),
            max_threads: 16,
            max_processes: 8,
            max_output_bytes: 64 * 1024,
            max_source_bytes: 128 * 1024,
            deny_patterns: default_deny_patterns(),
        }
    }
}

/// Known-dangerous constructs rejected before compilation. A substring
/// heuristic, not a sound analyzer; see [`crate::Screener`].
pub fn default_deny_patterns() -> Vec<String> {
    [
        r"\bsystem\s*\(",
        r"\bpopen\s*\(",
        r"\bexec[lv]p?e?\s*\(",
        r"\bfork\s*\(",
        r"\bvfork\s*\(",
        r"\bsyscall\s*\(",
        r"\b__asm__",
        r"\basm\s*[(v{]",
        r"\bfopen\s*\(",
        r"\bfreopen\s*\(",
        r"\bopen(at)?\s*\(",
        r"\bsocket\s*\(",
        r"sys/socket\.h",
        r"\bconnect\s*\(",
        r"\bunlink\s*\(",
        r"\bremove\s*\(",
        r"\bkill\s*\(",
        r"\bptrace\s*\(",
    ]
    .iter()
    .map(|p| (*p).to_string())
    .collect()
}
