//! Top-level relay orchestration.
//!
//! [`run_relay`] wires the pieces together for one session:
//!
//! 1. Spawns the inbound worker (remote → terminal) and the outbound worker
//!    (terminal → remote) as independent Tokio tasks.
//! 2. Runs the [`ShutdownCoordinator`] on the calling task until it reaches
//!    `Terminated`.
//! 3. Joins both workers before returning, so raw mode has been restored and
//!    no task outlives the session.
//!
//! Neither worker waits for the other; only this function joins them.

use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::coordinator::{EventSources, RelayOutcome, ShutdownCoordinator};
use crate::application::inbound::InboundReader;
use crate::application::outbound::{OutboundExit, OutboundReader};
use crate::application::ports::{FrameSink, FrameSource, LocalInput, TerminalMode};
use crate::domain::{DeviceError, InputChunk, RelayConfig, RelayError, TerminationSignal};

/// Capacity of the chunk conduit between the outbound worker and the
/// coordinator.  Keystrokes are tiny; a short queue only absorbs bursts such
/// as a paste.
const CHUNK_CONDUIT_CAPACITY: usize = 32;

/// Everything a relay session runs on.
pub struct RelayParts<Src, Snk, In, Out> {
    /// Receive half of the remote channel.
    pub source: Src,
    /// Send half of the remote channel.
    pub sink: Snk,
    /// Local input device.
    pub input: In,
    /// Local output (stdout in production).
    pub output: Out,
    /// Terminal whose raw mode the input worker holds.
    pub terminal: Arc<dyn TerminalMode>,
    /// One message per operator interrupt.
    pub interrupts: mpsc::Receiver<()>,
}

/// Runs one relay session to completion.
///
/// # Errors
///
/// - [`RelayError::Device`] if the terminal could not be put into raw mode.
///   The remote is still closed gracefully before this is returned.
/// - [`RelayError::WorkerPanicked`] if either worker panicked.
pub async fn run_relay<Src, Snk, In, Out>(
    parts: RelayParts<Src, Snk, In, Out>,
    config: &RelayConfig,
) -> Result<RelayOutcome, RelayError>
where
    Src: FrameSource + 'static,
    Snk: FrameSink,
    In: LocalInput + 'static,
    Out: AsyncWrite + Unpin + Send + 'static,
{
    let RelayParts {
        source,
        sink,
        input,
        output,
        terminal,
        interrupts,
    } = parts;

    let termination = TerminationSignal::new();
    let cancel = CancellationToken::new();
    let (chunk_tx, chunk_rx) = mpsc::channel::<InputChunk>(CHUNK_CONDUIT_CAPACITY);

    // ── Inbound worker: remote → terminal ────────────────────────────────────
    let mut inbound = InboundReader::new(source, output, termination.clone());
    let mut inbound_task = tokio::spawn(async move { inbound.run().await });

    // ── Outbound worker: terminal → chunk conduit ────────────────────────────
    let outbound = OutboundReader::new(
        input,
        terminal,
        chunk_tx,
        cancel.clone(),
        config.max_read_errors,
    );
    let outbound_task = tokio::spawn(outbound.run());

    // ── Coordinator ──────────────────────────────────────────────────────────
    info!("starting main loop...");
    let mut coordinator = ShutdownCoordinator::new(sink, config.close_timeout, cancel);
    let outcome = coordinator
        .run(EventSources {
            chunks: chunk_rx,
            termination,
            interrupts,
        })
        .await;
    info!("relay terminated: {outcome:?}");

    // ── Join both workers ────────────────────────────────────────────────────
    let outbound_result = join_outbound(outbound_task).await;

    // After a close handshake the remote's reply ends the inbound worker on
    // its own; give it `close_timeout` to arrive before aborting the receive.
    match tokio::time::timeout(config.close_timeout, &mut inbound_task).await {
        Ok(joined) => {
            let error = joined.map_err(|e| worker_failure("inbound", e))?;
            debug!("inbound worker finished: {error}");
        }
        Err(_) => {
            debug!("remote did not finish the close handshake; aborting inbound worker");
            inbound_task.abort();
            if let Err(e) = inbound_task.await {
                if e.is_panic() {
                    return Err(worker_failure("inbound", e));
                }
            }
        }
    }

    match outbound_result? {
        Ok(exit) => {
            debug!("outbound worker finished: {exit:?}");
            Ok(outcome)
        }
        Err(e) => Err(RelayError::Device(e)),
    }
}

async fn join_outbound(
    task: JoinHandle<Result<OutboundExit, DeviceError>>,
) -> Result<Result<OutboundExit, DeviceError>, RelayError> {
    task.await.map_err(|e| worker_failure("outbound", e))
}

fn worker_failure(worker: &'static str, error: JoinError) -> RelayError {
    warn!("{worker} worker did not finish cleanly: {error}");
    RelayError::WorkerPanicked { worker }
}
