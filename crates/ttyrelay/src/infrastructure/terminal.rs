//! Raw mode on the controlling terminal via `crossterm`.
//!
//! crossterm remembers the original termios (or console mode on Windows)
//! when raw mode is enabled and puts it back on disable, so this type carries
//! no state of its own.  Pair it with
//! [`RawTerminalSession`](crate::application::RawTerminalSession) to get the
//! scoped acquire/restore behaviour.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::application::ports::TerminalMode;
use crate::domain::DeviceError;

/// The process's controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermTerminal;

impl TerminalMode for CrosstermTerminal {
    fn enable_raw(&self) -> Result<(), DeviceError> {
        enable_raw_mode().map_err(DeviceError::EnableRaw)
    }

    fn restore(&self) -> Result<(), DeviceError> {
        disable_raw_mode().map_err(DeviceError::Restore)
    }
}
