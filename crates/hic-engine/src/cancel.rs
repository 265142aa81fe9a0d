//! Cooperative cancellation.
//!
//! A [`CancelToken`] is set from a signal handler and polled by the event
//! loop at event boundaries only. The first request also latches a
//! suppression flag; every later request is ignored, so shutdown cannot be
//! interrupted a second time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    requested: Arc<AtomicBool>,
    suppressed: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token with no request pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns `true` for the first request and
    /// `false` for every request after it.
    pub fn request(&self) -> bool {
        if self.suppressed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.requested.store(true, Ordering::SeqCst);
        true
    }

    /// `true` once cancellation has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Route SIGINT, SIGTERM and SIGHUP to this token.
    ///
    /// # Errors
    ///
    /// Fails if a handler is already installed for this process.
    pub fn install_signal_handler(&self) -> Result<(), ctrlc::Error> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            if token.request() {
                warn!("interrupt received, stopping after the current event");
            }
        })
    }
}
