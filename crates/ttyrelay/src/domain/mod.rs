//! Domain layer for ttyrelay.
//!
//! Pure types with no I/O: frames, input chunks, the termination signal,
//! configuration and the error taxonomy.  Nothing in here touches a socket or
//! the terminal, so every type can be exercised in plain unit tests.

pub mod config;
pub mod error;
pub mod frame;
pub mod signal;

pub use config::{AuthConfig, RelayConfig};
pub use error::{ConnectionError, DeviceError, RelayError};
pub use frame::{Frame, FrameKind, InputChunk, NORMAL_CLOSURE, READ_CHUNK_SIZE};
pub use signal::TerminationSignal;
