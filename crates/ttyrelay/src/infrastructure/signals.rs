//! Operator interrupt source.
//!
//! Raw mode turns off the terminal's own Ctrl+C handling, so a Ctrl+C typed
//! into the relay is forwarded to the remote as byte 0x03.  The interrupt
//! handled here comes from outside the terminal, e.g. `kill -INT`.

use std::io;

use futures_util::{stream, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Spawns a task that forwards every Ctrl+C (SIGINT) as one message.
///
/// Interrupts arriving while a previous one is still unconsumed are
/// coalesced.  The task stops once the receiver is dropped.
pub fn spawn_interrupt_listener() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(1);

    let ctrl_c = stream::unfold((), |()| async { Some((tokio::signal::ctrl_c().await, ())) });
    tokio::spawn(forward_interrupts(Box::pin(ctrl_c), tx));

    rx
}

/// Forwards each `Ok` from `interrupts` into `tx` without waiting.
///
/// Returns when the source fails or ends, or when nobody listens any more.
async fn forward_interrupts<S>(mut interrupts: S, tx: mpsc::Sender<()>)
where
    S: Stream<Item = io::Result<()>> + Unpin,
{
    while let Some(interrupt) = interrupts.next().await {
        if let Err(e) = interrupt {
            error!("failed to listen for Ctrl+C signal: {e}");
            return;
        }
        match tx.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!("interrupt already pending; coalescing");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                debug!("interrupt receiver dropped; listener exiting");
                return;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
