use thiserror::Error;

/// Host-level failures. Everything attributable to the submitted code
/// (rejection, compile errors, crashes, timeouts) is reported as a
/// [`crate::CompileOutcome`] instead and never surfaces here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("scratch space exhausted: {0}")]
    ResourceExhausted(String),

    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("invalid deny-list pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("system error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
