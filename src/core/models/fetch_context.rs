use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::errors::{Result, TivorError};

/// Per-request context threaded through every backend fetch.
///
/// Clones share one cancellation flag, so a signal handler holding a clone
/// can abort a load that is in progress.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    cancelled: Arc<AtomicBool>,
}

impl FetchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of any fetch using this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(TivorError::Cancelled);
        }
        Ok(())
    }
}
