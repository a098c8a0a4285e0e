use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::Error, types::Language, Result};

/// Hands out per-request scratch directories and tracks how many are live.
///
/// Each request owns exactly one [`Workspace`]; nothing is shared between
/// concurrent requests, so no locking is involved.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    scratch_root: PathBuf,
    live: Arc<AtomicUsize>,
}

impl WorkspaceManager {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a collision-free workspace directory under the scratch root.
    ///
    /// Failure here means the host cannot provide scratch space and is not
    /// attributable to the submitted code.
    pub async fn acquire(&self) -> Result<Workspace> {
        fs::create_dir_all(&self.scratch_root)
            .await
            .map_err(|e| Error::ResourceExhausted(format!("scratch root unavailable: {}", e)))?;

        let dir = self.scratch_root.join(format!("job-{}", Uuid::new_v4()));
        fs::create_dir(&dir)
            .await
            .map_err(|e| Error::ResourceExhausted(format!("workspace creation failed: {}", e)))?;

        self.live.fetch_add(1, Ordering::SeqCst);
        debug!(workspace = %dir.display(), "workspace acquired");

        Ok(Workspace {
            dir,
            released: false,
            live: Arc::clone(&self.live),
        })
    }

    /// Number of workspaces acquired but not yet released.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Remove leftover workspaces older than `max_age`, e.g. from a crashed
    /// previous run. Returns how many directories were removed.
    pub async fn sweep_stale(&self, max_age: Duration) -> Result<usize> {
        let mut removed = 0;
        let mut entries = match fs::read_dir(&self.scratch_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let stale = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.elapsed().ok())
                .is_some_and(|age| age >= max_age);
            if stale {
                if let Err(e) = fs::remove_dir_all(entry.path()).await {
                    warn!(path = %entry.path().display(), "failed to sweep stale workspace: {}", e);
                } else {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

/// Exclusively-owned scratch directory holding one request's source file
/// and compiled artifact.
///
/// Released recursively on every exit path: explicitly via [`release`],
/// or by `Drop` when the request unwinds or errors out. Release is
/// idempotent and tolerates a partially written or already-removed tree.
///
/// [`release`]: Workspace::release
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    released: bool,
    live: Arc<AtomicUsize>,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path the submitted source is written to.
    pub fn source_path(&self, language: Language) -> PathBuf {
        self.dir.join(language.source_file_name())
    }

    /// Path the compiled binary is written to.
    pub fn binary_path(&self) -> PathBuf {
        self.dir.join("program")
    }

    /// Recursively remove the workspace. Safe to call more than once.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.live.fetch_sub(1, Ordering::SeqCst);
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => debug!(workspace = %self.dir.display(), "workspace released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(workspace = %self.dir.display(), "workspace release failed: {}", e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.live.fetch_sub(1, Ordering::SeqCst);
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(workspace = %self.dir.display(), "workspace cleanup on drop failed: {}", e);
            }
        }
    }
}
