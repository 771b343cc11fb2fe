//! One-shot termination signal raised when the remote side goes away.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio_util::sync::CancellationToken;

/// A one-shot broadcast meaning "the relay must stop".
///
/// Cloning yields another handle to the same signal.  Only the first
/// [`raise`](Self::raise) has an effect; every later call is a no-op and
/// reports so by returning `false`.  Any number of handles may wait on
/// [`raised`](Self::raised), before or after the signal fires.
#[derive(Debug, Clone, Default)]
pub struct TerminationSignal {
    fired: Arc<AtomicBool>,
    token: CancellationToken,
}

impl TerminationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal.  Returns `true` only for the call that actually
    /// fired it.
    pub fn raise(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.token.cancel();
        true
    }

    pub fn is_raised(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Resolves once the signal has been raised.  Cancel-safe, so it can sit
    /// in a `tokio::select!` branch that is polled repeatedly.
    pub async fn raised(&self) {
        self.token.cancelled().await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
