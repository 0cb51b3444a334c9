//! Document loading capability and timeout-bounded background fetches.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, SceneError};

/// Source of raw document text.
///
/// Implementations are shared across loader threads, so they must be
/// `Send + Sync`. Paths handed to [`load`](Self::load) are already resolved
/// against the importing document and normalised.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<String>;
}

/// Reads documents from the filesystem
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    root: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative document paths against `root` instead of the working directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl DocumentLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<String> {
        let full = match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };
        std::fs::read_to_string(&full).map_err(|source| SceneError::Io { path: full, source })
    }
}

/// In-memory document store keyed by normalised path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Add a document
    pub fn with_document(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.documents
            .insert(normalize_path(path.as_ref()), text.into());
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<String> {
        self.documents
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| SceneError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            })
    }
}

/// Collapses `.` and `..` components without touching the filesystem.
///
/// `..` at the start of a relative path is kept; `..` directly below the root
/// is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves an import entry relative to the directory of the importing document
pub fn resolve_import_path(importer: &Path, import: &str) -> PathBuf {
    let base = importer.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(import))
}

/// A document load running on a worker thread
pub(crate) struct PendingLoad {
    path: PathBuf,
    started: Instant,
    receiver: flume::Receiver<Result<String>>,
}

impl PendingLoad {
    /// Starts loading `path` in the background
    pub(crate) fn spawn(loader: Arc<dyn DocumentLoader>, path: PathBuf) -> Result<Self> {
        let (sender, receiver) = flume::bounded(1);
        let worker_path = path.clone();

        std::thread::Builder::new()
            .name(format!("scene-load:{}", path.display()))
            .spawn(move || {
                let result = loader.load(&worker_path);
                // The receiver is gone when the resolution already failed or timed out.
                let _ = sender.send(result);
            })
            .map_err(|e| SceneError::LoadFailed {
                path: path.clone(),
                reason: format!("could not start loader thread: {e}"),
            })?;

        log::trace!("started loading {}", path.display());

        Ok(Self {
            path,
            started: Instant::now(),
            receiver,
        })
    }

    /// Waits for the load, counting the time since it was spawned against `timeout`
    pub(crate) fn wait(self, timeout: Duration) -> Result<String> {
        let remaining = timeout.saturating_sub(self.started.elapsed());
        match self.receiver.recv_timeout(remaining) {
            Ok(result) => result,
            Err(flume::RecvTimeoutError::Timeout) => Err(SceneError::ImportTimeout {
                path: self.path,
                timeout,
            }),
            Err(flume::RecvTimeoutError::Disconnected) => Err(SceneError::LoadFailed {
                path: self.path,
                reason: "loader thread exited without producing a document".to_string(),
            }),
        }
    }
}

/// Loads one document with a bounded wait
pub(crate) fn load_with_timeout(
    loader: &Arc<dyn DocumentLoader>,
    path: &Path,
    timeout: Duration,
) -> Result<String> {
    PendingLoad::spawn(Arc::clone(loader), path.to_path_buf())?.wait(timeout)
}
