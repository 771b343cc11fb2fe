//! The shutdown coordinator: sole writer to the remote channel.
//!
//! Every frame that leaves the process goes through [`ShutdownCoordinator`].
//! Funnelling all three stop conditions (remote gone, operator interrupt,
//! local input gone) through one `select!` is what guarantees that no data
//! frame can race the close frame.
//!
//! # State machine
//!
//! ```text
//!                 chunk ─▶ send Data (errors logged)
//!                 ┌──────┐
//!                 ▼      │
//!            ┌─────────┐─┘  termination signal   ┌────────────┐
//!  start ──▶ │ Running │ ──────────────────────▶ │ Terminated │
//!            └─────────┘                          └────────────┘
//!                 │ interrupt / input ended             ▲
//!                 ▼                                     │
//!            ┌─────────┐  send Close (bounded, once)   │
//!            │ Closing │ ───────────────────────────────┘
//!            └─────────┘
//! ```
//!
//! Leaving `Running` cancels the input worker and closes the chunk conduit,
//! so a chunk that was in flight at that moment is dropped, never sent.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::ports::FrameSink;
use crate::domain::{ConnectionError, Frame, InputChunk, TerminationSignal};

/// Coordinator states.  `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Running,
    Closing,
    Terminated,
}

/// How the relay session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The remote closed or failed; no close handshake was attempted.
    RemoteClosed,
    /// The operator interrupted the session.
    Interrupted { close_sent: bool },
    /// Local input stopped producing (end of input, repeated read failures,
    /// or no usable terminal).
    InputEnded { close_sent: bool },
}

/// The three event sources the coordinator multiplexes.
pub struct EventSources {
    /// Chunks read by the input worker.  Closed when the worker exits.
    pub chunks: mpsc::Receiver<InputChunk>,
    /// Raised by the inbound worker when the remote goes away.
    pub termination: TerminationSignal,
    /// One message per operator interrupt.
    pub interrupts: mpsc::Receiver<()>,
}

#[derive(Debug, Clone, Copy)]
enum CloseCause {
    Interrupt,
    InputEnded,
}

/// Serializes all outbound traffic and sequences the close handshake.
pub struct ShutdownCoordinator<K> {
    sink: K,
    state: CoordinatorState,
    close_timeout: Duration,
    cancel: CancellationToken,
}

impl<K: FrameSink> ShutdownCoordinator<K> {
    /// Creates a coordinator in the `Running` state.
    ///
    /// `cancel` is the token the input worker watches; the coordinator
    /// cancels it when it leaves `Running`.
    pub fn new(sink: K, close_timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            sink,
            state: CoordinatorState::Running,
            close_timeout,
            cancel,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Drives the state machine to `Terminated` and reports why it ended.
    ///
    /// Calling `run` again after it has returned sends nothing and reports
    /// [`RelayOutcome::RemoteClosed`].
    pub async fn run(&mut self, mut events: EventSources) -> RelayOutcome {
        let mut interrupts_open = true;
        let mut cause = None;

        while self.state == CoordinatorState::Running {
            tokio::select! {
                chunk = events.chunks.recv() => match chunk {
                    Some(chunk) => self.forward(chunk).await,
                    None => {
                        info!("local input closed; closing the session");
                        cause = Some(CloseCause::InputEnded);
                        self.leave_running(&mut events, CoordinatorState::Closing);
                    }
                },
                () = events.termination.raised() => {
                    info!("remote connection ended; terminating without close handshake");
                    self.leave_running(&mut events, CoordinatorState::Terminated);
                }
                interrupt = events.interrupts.recv(), if interrupts_open => match interrupt {
                    Some(()) => {
                        info!("received interrupt, terminating cleanly...");
                        cause = Some(CloseCause::Interrupt);
                        self.leave_running(&mut events, CoordinatorState::Closing);
                    }
                    None => {
                        warn!("interrupt source went away; continuing without it");
                        interrupts_open = false;
                    }
                },
            }
        }

        let close_sent = if self.state == CoordinatorState::Closing {
            let sent = self.send_close().await;
            self.state = CoordinatorState::Terminated;
            sent
        } else {
            false
        };

        match cause {
            Some(CloseCause::Interrupt) => RelayOutcome::Interrupted { close_sent },
            Some(CloseCause::InputEnded) => RelayOutcome::InputEnded { close_sent },
            None => RelayOutcome::RemoteClosed,
        }
    }

    /// Sends one Data frame.  A send that fails or outlasts `close_timeout`
    /// is logged and dropped; the coordinator stays `Running` either way, so
    /// a stalled transport cannot hide an interrupt or a termination.
    async fn forward(&mut self, chunk: InputChunk) {
        if let Err(e) = self.bounded_send(chunk.into_frame()).await {
            error!("failed to write to websocket: {e}");
        }
    }

    async fn bounded_send(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        tokio::time::timeout(self.close_timeout, self.sink.send_frame(frame))
            .await
            .unwrap_or_else(|_| Err(ConnectionError::Timeout(self.close_timeout)))
    }

    /// Stops the input worker and the conduit, then moves to `next`.
    fn leave_running(&mut self, events: &mut EventSources, next: CoordinatorState) {
        self.cancel.cancel();
        events.chunks.close();
        self.state = next;
    }

    /// Sends the one and only Close frame, bounded by `close_timeout`.
    async fn send_close(&mut self) -> bool {
        match self.bounded_send(Frame::close()).await {
            Ok(()) => {
                debug!("close frame sent");
                true
            }
            Err(e) => {
                error!("failed to close websocket: {e}");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
