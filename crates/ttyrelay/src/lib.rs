//! ttyrelay library crate.
//!
//! Attaches the local terminal to a remote text session over a WebSocket:
//! keystrokes go out as they are typed, remote output is written to stdout
//! as it arrives, and the session ends with exactly one graceful close.
//!
//! # Architecture
//!
//! ```text
//! stdin ──▶ OutboundReader ──chunk conduit──▶ ShutdownCoordinator ──▶ WebSocket
//!             (raw mode held)                    ▲        ▲
//!                                  TerminationSignal      interrupts (Ctrl+C)
//!                                         ▲
//! stdout ◀── InboundReader ◀──────────────┴──────────────────────────── WebSocket
//! ```
//!
//! - `domain/`          Frames, configuration, termination signal, errors
//! - `application/`     The workers, the coordinator and [`application::run_relay`]
//! - `infrastructure/`  WebSocket client, stdin thread, crossterm raw mode
//!
//! # Layer rules
//!
//! - `domain` performs no I/O.
//! - `application` talks to the outside world only through the traits in
//!   [`application::ports`].
//! - `infrastructure` implements those traits with tokio-tungstenite,
//!   crossterm and the standard streams.

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: the relay engine.
pub mod application;

/// Infrastructure layer: WebSocket, terminal and stdin adapters.
pub mod infrastructure;
