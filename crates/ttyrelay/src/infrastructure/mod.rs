//! Infrastructure layer for ttyrelay.
//!
//! Concrete implementations of the application ports, plus the process-level
//! plumbing around them.
//!
//! # Responsibilities
//!
//! - Dialing the BBS WebSocket endpoint with the credential headers
//! - Mapping WebSocket messages to and from relay frames
//! - Reading stdin on a blocking thread
//! - Switching the controlling terminal in and out of raw mode
//! - Listening for operator interrupts
//!
//! # What does NOT belong here?
//!
//! - Shutdown ordering and the close handshake (application layer)
//! - Frame and error types (domain layer)
//! - CLI parsing (`main.rs`)

pub mod mock;
pub mod signals;
pub mod stdin;
pub mod terminal;
pub mod ws_channel;

pub use signals::spawn_interrupt_listener;
pub use stdin::StdinInput;
pub use terminal::CrosstermTerminal;
pub use ws_channel::{connect, WsFrameSink, WsFrameSource};
