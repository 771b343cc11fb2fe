//! In-memory fakes for the relay's seams.
//!
//! These stand in for the WebSocket, the terminal driver and stdin in unit
//! and integration tests, so the full relay can run without a network or a
//! TTY.  Each fake records what happened to it behind an `Arc<Mutex<..>>`
//! so tests can inspect it after the relay has consumed the fake itself.

use std::io;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::ports::{FrameSink, FrameSource, LocalInput, TerminalMode};
use crate::domain::{ConnectionError, DeviceError, Frame, FrameKind, InputChunk};

// ── Frame sink ────────────────────────────────────────────────────────────────

/// Shared log of every frame handed to a [`RecordingSink`], in call order.
///
/// Failed and stalled sends are logged too: the log answers "what did the
/// relay try to send", which is what the ordering properties are about.
#[derive(Debug, Clone, Default)]
pub struct SentFrames(Arc<Mutex<Vec<Frame>>>);

impl SentFrames {
    pub fn frames(&self) -> Vec<Frame> {
        self.0.lock().expect("lock poisoned").clone()
    }

    /// Payloads of the data frames, in send order.
    pub fn data_payloads(&self) -> Vec<Vec<u8>> {
        self.frames()
            .into_iter()
            .filter(|f| f.kind() == FrameKind::Data)
            .map(Frame::into_payload)
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.frames().iter().filter(|f| f.is_close()).count()
    }

    fn push(&self, frame: Frame) {
        self.0.lock().expect("lock poisoned").push(frame);
    }
}

/// A [`FrameSink`] that records every frame it is given.
pub struct RecordingSink {
    sent: SentFrames,
    failing_data_sends: usize,
    stall_data: bool,
    close_behaviour: CloseBehaviour,
}

#[derive(Debug, Clone, Copy)]
enum CloseBehaviour {
    Succeed,
    Fail,
    Stall,
}

impl RecordingSink {
    /// Creates a sink where every send succeeds, plus a handle to its log.
    pub fn new() -> (Self, SentFrames) {
        let sent = SentFrames::default();
        let sink = Self {
            sent: sent.clone(),
            failing_data_sends: 0,
            stall_data: false,
            close_behaviour: CloseBehaviour::Succeed,
        };
        (sink, sent)
    }

    /// The first `n` data sends fail with a transport error.
    pub fn failing_data_sends(mut self, n: usize) -> Self {
        self.failing_data_sends = n;
        self
    }

    /// Every data send hangs forever (after being recorded).
    pub fn stalling_data_sends(mut self) -> Self {
        self.stall_data = true;
        self
    }

    /// The close send fails with a transport error.
    pub fn failing_close(mut self) -> Self {
        self.close_behaviour = CloseBehaviour::Fail;
        self
    }

    /// The close send never completes.
    pub fn stalling_close(mut self) -> Self {
        self.close_behaviour = CloseBehaviour::Stall;
        self
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        let kind = frame.kind();
        self.sent.push(frame);

        match kind {
            FrameKind::Data if self.stall_data => std::future::pending().await,
            FrameKind::Data if self.failing_data_sends > 0 => {
                self.failing_data_sends -= 1;
                Err(ConnectionError::Transport("injected send failure".to_string()))
            }
            FrameKind::Data => Ok(()),
            FrameKind::Close => match self.close_behaviour {
                CloseBehaviour::Succeed => Ok(()),
                CloseBehaviour::Fail => {
                    Err(ConnectionError::Transport("injected close failure".to_string()))
                }
                CloseBehaviour::Stall => std::future::pending().await,
            },
        }
    }
}

// ── Frame source ──────────────────────────────────────────────────────────────

/// A [`FrameSource`] driven by the test through a [`RemoteFeed`].
///
/// Once every [`RemoteFeed`] handle has been dropped and the queue is empty,
/// the source reports [`ConnectionError::Closed`], like a remote that hung up.
pub struct ScriptedSource {
    rx: mpsc::UnboundedReceiver<Result<Frame, ConnectionError>>,
}

/// Test-side handle for pushing inbound frames into a [`ScriptedSource`].
#[derive(Clone)]
pub struct RemoteFeed {
    tx: mpsc::UnboundedSender<Result<Frame, ConnectionError>>,
}

impl RemoteFeed {
    /// Delivers a data frame.
    pub fn data(&self, payload: &[u8]) {
        let _ = self.tx.send(Ok(Frame::data(payload)));
    }

    /// Makes the next receive fail with `error`.
    pub fn fail(&self, error: ConnectionError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Creates a scripted inbound source and its feed.
pub fn scripted_source() -> (ScriptedSource, RemoteFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScriptedSource { rx }, RemoteFeed { tx })
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn receive_frame(&mut self) -> Result<Frame, ConnectionError> {
        self.rx.recv().await.unwrap_or(Err(ConnectionError::Closed))
    }
}

// ── Local input ───────────────────────────────────────────────────────────────

/// A [`LocalInput`] driven by the test through an [`InputFeed`].
///
/// When the queue is empty the input blocks, like an idle terminal, until
/// the feed pushes more.  It keeps blocking after every feed is dropped:
/// end of input only happens through [`InputFeed::end`].
pub struct ScriptedInput {
    rx: mpsc::UnboundedReceiver<io::Result<Option<InputChunk>>>,
}

/// Test-side handle for pushing reads into a [`ScriptedInput`].
#[derive(Clone)]
pub struct InputFeed {
    tx: mpsc::UnboundedSender<io::Result<Option<InputChunk>>>,
}

impl InputFeed {
    /// Queues a successful read of `bytes`.
    pub fn chunk(&self, bytes: &[u8]) {
        let _ = self.tx.send(Ok(Some(InputChunk::new(bytes))));
    }

    /// Queues a failed read.
    pub fn error(&self, kind: io::ErrorKind) {
        let _ = self.tx.send(Err(io::Error::new(kind, "injected read failure")));
    }

    /// Queues end of input.
    pub fn end(&self) {
        let _ = self.tx.send(Ok(None));
    }
}

/// Creates a scripted input device and its feed.
pub fn scripted_input() -> (ScriptedInput, InputFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScriptedInput { rx }, InputFeed { tx })
}

#[async_trait]
impl LocalInput for ScriptedInput {
    async fn read_chunk(&mut self) -> io::Result<Option<InputChunk>> {
        match self.rx.recv().await {
            Some(read) => read,
            None => std::future::pending().await,
        }
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// A [`TerminalMode`] that counts raw-mode transitions.
///
/// Clones share the counters, so a test can keep one clone and hand another
/// to the relay.
#[derive(Debug, Clone, Default)]
pub struct CountingTerminal {
    enables: Arc<AtomicUsize>,
    restores: Arc<AtomicUsize>,
    refuse_raw: bool,
}

impl CountingTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A terminal that cannot be put into raw mode (e.g. not a TTY).
    pub fn refusing_raw_mode() -> Self {
        Self {
            refuse_raw: true,
            ..Self::default()
        }
    }

    /// Number of successful `enable_raw` calls.
    pub fn enables(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn restores(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }
}

impl TerminalMode for CountingTerminal {
    fn enable_raw(&self) -> Result<(), DeviceError> {
        if self.refuse_raw {
            return Err(DeviceError::EnableRaw(io::Error::new(
                io::ErrorKind::Unsupported,
                "not a terminal",
            )));
        }
        self.enables.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn restore(&self) -> Result<(), DeviceError> {
        self.restores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
