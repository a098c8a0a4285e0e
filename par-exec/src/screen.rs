use regex::RegexSet;

use crate::{types::ScreenResult, Result};

/// Deny-list screener run before any process is spawned.
///
/// This is a shallow, fail-closed heuristic over the raw source text: it
/// rejects the obvious constructs (process spawning, raw syscalls, inline
/// assembly, file and socket access) but cannot catch obfuscated or
/// semantically equivalent dangerous code. It is a cheap pre-filter, not a
/// soundness guarantee; deployments need process-level isolation
/// (container/VM/seccomp) as a separate layer.
#[derive(Debug, Clone)]
pub struct Screener {
    set: RegexSet,
    patterns: Vec<String>,
}

impl Screener {
    /// Compile the configured patterns once; the screener is immutable
    /// afterwards and shared freely across requests.
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            set: RegexSet::new(patterns)?,
            patterns: patterns.to_vec(),
        })
    }

    /// Scan the source. Reports the first matching pattern in deny-list
    /// order; a match means the request is rejected before compilation.
    pub fn screen(&self, source: &str) -> ScreenResult {
        ScreenResult {
            matched: self
                .set
                .matches(source)
                .iter()
                .next()
                .map(|i| self.patterns[i].clone()),
        }
    }
}
