//! Cooperative cancellation for sync runs.
//!
//! A [`CancelToken`] is handed to the engine once per run and checked at every
//! suspension point (before each HTTP request, each rate-limit wait, and each
//! backoff sleep). Cancellation is a request, not an interrupt: the operation
//! in flight completes, and the next checkpoint surfaces a `Cancelled` error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.
///
/// Clones share the same underlying flag, so a token can be handed to a
/// Ctrl+C handler while the engine holds another clone.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
