//! Error taxonomy for the relay.
//!
//! | Error                         | Raised by          | Policy                         |
//! |-------------------------------|--------------------|--------------------------------|
//! | [`DeviceError`]               | raw-mode acquire   | fatal, reported after shutdown |
//! | local read `std::io::Error`   | input device       | logged, loop continues         |
//! | [`ConnectionError`] (receive) | inbound worker     | ends the session               |
//! | [`ConnectionError`] (send)    | coordinator        | logged, loop continues         |
//! | close send failure / timeout  | coordinator        | logged, terminates anyway      |

use thiserror::Error;

/// The local terminal could not be switched into (or out of) raw mode.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to enable raw mode: {0}")]
    EnableRaw(#[source] std::io::Error),

    #[error("failed to restore terminal mode: {0}")]
    Restore(#[source] std::io::Error),
}

/// A failure on the remote duplex channel.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The remote closed the connection, gracefully or not.
    #[error("connection closed by remote")]
    Closed,

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A frame could not be sent within the allotted time.
    #[error("send timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Errors surfaced by [`crate::application::run_relay`] once both workers
/// have been joined.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Raw mode could not be acquired; the session had no usable terminal.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A worker task panicked.
    #[error("{worker} worker panicked")]
    WorkerPanicked { worker: &'static str },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
