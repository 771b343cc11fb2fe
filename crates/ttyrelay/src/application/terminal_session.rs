//! Scoped raw-mode ownership for the input worker.
//!
//! Raw mode is process-wide terminal driver state.  [`RawTerminalSession`]
//! turns it into a value: constructing one switches the terminal to raw
//! mode, and dropping it switches it back.  Because the restore lives in
//! `Drop`, it runs on every way out of the owning scope: normal return, an
//! early `?`, task cancellation, or a panic unwinding through the worker.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::TerminalMode;
use crate::domain::DeviceError;

/// Exclusive raw-mode handle on the local terminal.
///
/// The previous mode is restored exactly once per successful
/// [`acquire`](Self::acquire), either through [`release`](Self::release) or
/// on drop.
pub struct RawTerminalSession {
    device: Arc<dyn TerminalMode>,
    released: bool,
}

impl RawTerminalSession {
    /// Switches `device` into raw mode.
    ///
    /// # Errors
    ///
    /// Returns the device's [`DeviceError`] if raw mode cannot be entered.
    /// Nothing is restored in that case because nothing was changed.
    pub fn acquire(device: Arc<dyn TerminalMode>) -> Result<Self, DeviceError> {
        device.enable_raw()?;
        debug!("terminal switched to raw mode");
        Ok(Self {
            device,
            released: false,
        })
    }

    /// Restores the previous terminal mode now and reports the result.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Restore`] if the driver rejects the restore.
    /// The handle is consumed either way; no second restore is attempted.
    pub fn release(mut self) -> Result<(), DeviceError> {
        self.released = true;
        self.device.restore()
    }
}

impl Drop for RawTerminalSession {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.device.restore() {
            Ok(()) => debug!("terminal mode restored"),
            Err(e) => warn!("{e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
