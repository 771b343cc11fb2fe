//! Seams between the relay logic and the outside world.
//!
//! The workers and the coordinator only ever talk to these traits.  The
//! production implementations live in [`crate::infrastructure`]; tests use
//! `mockall` mocks or the fakes in [`crate::infrastructure::mock`].
//!
//! The remote duplex channel is split into a [`FrameSource`] and a
//! [`FrameSink`] so the two directions are owned by different tasks and can
//! never block each other.

use async_trait::async_trait;

use crate::domain::{ConnectionError, DeviceError, Frame, InputChunk};

/// Receive half of the remote duplex channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next inbound frame.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::Closed`] once the remote has closed the connection,
    /// [`ConnectionError::Transport`] on any other failure.  Either error ends
    /// the session; callers do not retry.
    async fn receive_frame(&mut self) -> Result<Frame, ConnectionError>;
}

/// Send half of the remote duplex channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send {
    /// Sends one frame.  Sending a Close frame performs the close handshake.
    async fn send_frame(&mut self, frame: Frame) -> Result<(), ConnectionError>;
}

/// The local input device.
#[async_trait]
pub trait LocalInput: Send {
    /// Waits for the next chunk of input.
    ///
    /// Returns `Ok(None)` at end of input.  Implementations must be
    /// cancel-safe: dropping the future before it completes loses no bytes.
    async fn read_chunk(&mut self) -> std::io::Result<Option<InputChunk>>;
}

/// The terminal driver whose input mode the relay switches.
#[cfg_attr(test, mockall::automock)]
pub trait TerminalMode: Send + Sync {
    /// Puts the terminal into raw mode, remembering the previous mode.
    fn enable_raw(&self) -> Result<(), DeviceError>;

    /// Restores the mode saved by [`enable_raw`](Self::enable_raw).
    fn restore(&self) -> Result<(), DeviceError>;
}
