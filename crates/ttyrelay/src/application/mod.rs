//! Application layer for ttyrelay.
//!
//! The relay engine: the two workers, the coordinator that owns the send
//! side of the remote channel, the raw-mode guard, and the orchestration that
//! ties them together.  Everything here is written against the traits in
//! [`ports`], so none of it needs a real socket or terminal to be tested.
//!
//! # What does NOT belong here?
//!
//! - WebSocket framing, TLS, HTTP headers (infrastructure)
//! - Reading the real stdin or switching the real terminal (infrastructure)
//! - CLI parsing and logging setup (`main.rs`)

pub mod coordinator;
pub mod inbound;
pub mod outbound;
pub mod ports;
pub mod relay;
pub mod terminal_session;

pub use coordinator::{CoordinatorState, EventSources, RelayOutcome, ShutdownCoordinator};
pub use inbound::InboundReader;
pub use outbound::{OutboundExit, OutboundReader};
pub use ports::{FrameSink, FrameSource, LocalInput, TerminalMode};
pub use relay::{run_relay, RelayParts};
pub use terminal_session::RawTerminalSession;
