//! Terminal → remote worker.
//!
//! Owns the terminal's raw mode for its whole lifetime, reads input in
//! chunks of at most [`READ_CHUNK_SIZE`](crate::domain::READ_CHUNK_SIZE)
//! bytes and hands each chunk to the coordinator over the chunk conduit.  The
//! worker never touches the remote channel itself.
//!
//! # Cancellation
//!
//! Cancellation is cooperative.  The worker checks the token right before
//! forwarding a chunk it has just read, and drops the chunk if cancellation
//! has been requested.  That check is a poll, not a lock: a chunk read just as
//! the coordinator leaves `Running` can still slip through.  The coordinator
//! never sends such a chunk, because it stops reading the conduit first.
//!
//! The worker also wakes on cancellation while it waits for input.  A
//! terminal read can block until the next keystroke, and the shutdown join
//! must not depend on the operator pressing a key.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::ports::{LocalInput, TerminalMode};
use crate::application::terminal_session::RawTerminalSession;
use crate::domain::{DeviceError, InputChunk};

/// Why the outbound worker stopped producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundExit {
    /// The coordinator requested cancellation.
    Cancelled,
    /// The input device reported end of input.
    EndOfInput,
    /// The input device failed too many times in a row.
    TooManyReadErrors,
    /// The coordinator stopped accepting chunks.
    ConduitClosed,
}

/// Reads the local input device and feeds the chunk conduit.
pub struct OutboundReader<I> {
    input: I,
    terminal: Arc<dyn TerminalMode>,
    chunks: mpsc::Sender<InputChunk>,
    cancel: CancellationToken,
    max_read_errors: u32,
}

impl<I: LocalInput> OutboundReader<I> {
    pub fn new(
        input: I,
        terminal: Arc<dyn TerminalMode>,
        chunks: mpsc::Sender<InputChunk>,
        cancel: CancellationToken,
        max_read_errors: u32,
    ) -> Self {
        Self {
            input,
            terminal,
            chunks,
            cancel,
            max_read_errors: max_read_errors.max(1),
        }
    }

    /// Runs the read loop until cancellation, end of input, or too many
    /// consecutive read failures.
    ///
    /// Raw mode is held for the duration of the call and restored on every
    /// return path.  The chunk sender is dropped on return, which tells the
    /// coordinator that no more chunks will come.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the terminal cannot be put into raw mode.
    /// No input is read in that case.
    pub async fn run(self) -> Result<OutboundExit, DeviceError> {
        let Self {
            mut input,
            terminal,
            chunks,
            cancel,
            max_read_errors,
        } = self;

        let _raw_mode = RawTerminalSession::acquire(terminal)?;
        let mut consecutive_errors: u32 = 0;

        loop {
            let read = tokio::select! {
                () = cancel.cancelled() => {
                    debug!("input worker cancelled while waiting for input");
                    return Ok(OutboundExit::Cancelled);
                }
                read = input.read_chunk() => read,
            };

            match read {
                Ok(Some(chunk)) => {
                    consecutive_errors = 0;

                    if cancel.is_cancelled() {
                        debug!("input worker cancelled; dropping {} byte chunk", chunk.len());
                        return Ok(OutboundExit::Cancelled);
                    }

                    debug!("terminal → remote: {} bytes", chunk.len());
                    if chunks.send(chunk).await.is_err() {
                        debug!("chunk conduit closed; input worker exiting");
                        return Ok(OutboundExit::ConduitClosed);
                    }
                }
                Ok(None) => {
                    info!("local input reached end of file");
                    return Ok(OutboundExit::EndOfInput);
                }
                Err(e) => {
                    consecutive_errors += 1;
                    error!("failed to read stdin: {e}");
                    if consecutive_errors >= max_read_errors {
                        error!("giving up on local input after {consecutive_errors} consecutive read errors");
                        return Ok(OutboundExit::TooManyReadErrors);
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
