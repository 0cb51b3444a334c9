//! Options controlling a single resolution pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SceneError};

/// Default bound for a single document load
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Cooperative cancellation flag shared between a caller and a resolution.
///
/// Clones share the same flag. The resolver polls it between import steps and
/// between object steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`SceneError::Cancelled`] once [`cancel`](Self::cancel) was called
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SceneError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Resolution settings
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Upper bound for loading one document
    pub load_timeout: Duration,
    /// Fetch the direct imports of a document in parallel before merging them
    pub concurrent_loads: bool,
    pub cancel: CancellationToken,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            concurrent_loads: true,
            cancel: CancellationToken::new(),
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set the per-document load timeout
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Builder pattern: Enable or disable parallel fetching of imports
    pub fn with_concurrent_loads(mut self, enabled: bool) -> Self {
        self.concurrent_loads = enabled;
        self
    }

    /// Builder pattern: Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}
