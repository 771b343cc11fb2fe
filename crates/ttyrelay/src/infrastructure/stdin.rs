//! Blocking stdin reads bridged into the async relay.
//!
//! Reading a terminal is a blocking syscall that may not return until the
//! next keystroke, so it runs on a dedicated OS thread.  The thread pushes
//! each read result into a small bounded channel; the async side just
//! receives from it, which makes [`LocalInput::read_chunk`] cancel-safe.
//!
//! The thread is never joined.  It ends when the receiving side is dropped
//! (on its next send) or when the process exits, whichever comes first.

use std::io::{self, ErrorKind, Read};
use std::thread;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::ports::LocalInput;
use crate::domain::{InputChunk, READ_CHUNK_SIZE};

/// Read results buffered between the reader thread and the relay.
const PUMP_CAPACITY: usize = 4;

type ReadResult = io::Result<Option<InputChunk>>;

/// Local input backed by a reader thread.
pub struct StdinInput {
    rx: mpsc::Receiver<ReadResult>,
}

impl StdinInput {
    /// Starts reading the process's standard input.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader thread cannot be spawned.
    pub fn spawn() -> io::Result<Self> {
        Self::from_reader(io::stdin())
    }

    /// Starts reading an arbitrary blocking reader on its own thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader thread cannot be spawned.
    pub fn from_reader<R>(reader: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(PUMP_CAPACITY);
        thread::Builder::new()
            .name("ttyrelay-stdin".to_string())
            .spawn(move || pump(reader, tx))?;
        Ok(Self { rx })
    }
}

/// Reader-thread body.  Stops after end of input or once nobody listens.
fn pump<R: Read>(mut reader: R, tx: mpsc::Sender<ReadResult>) {
    let mut buffer = [0u8; READ_CHUNK_SIZE];
    loop {
        let result = match reader.read(&mut buffer) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(InputChunk::new(buffer[..n].to_vec()))),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => Err(e),
        };

        let at_end = matches!(result, Ok(None));
        if tx.blocking_send(result).is_err() {
            debug!("stdin reader thread exiting: relay stopped listening");
            return;
        }
        if at_end {
            debug!("stdin reader thread exiting: end of input");
            return;
        }
    }
}

#[async_trait]
impl LocalInput for StdinInput {
    async fn read_chunk(&mut self) -> io::Result<Option<InputChunk>> {
        // A vanished reader thread looks like end of input.
        self.rx.recv().await.unwrap_or(Ok(None))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A reader that fails once, then delegates.
    struct FlakyReader {
        failed: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::Error::other("device hiccup"));
            }
            self.inner.read(buf)
        }
    }

    #[tokio::test]
    async fn test_reads_are_capped_at_chunk_size() {
        // Arrange: 600 bytes need three reads of at most 256
        let mut input = StdinInput::from_reader(Cursor::new(vec![b'z'; 600])).unwrap();

        // Act
        let mut sizes = Vec::new();
        while let Some(chunk) = input.read_chunk().await.unwrap() {
            sizes.push(chunk.len());
        }

        // Assert
        assert!(sizes.iter().all(|&n| n <= READ_CHUNK_SIZE));
        assert_eq!(sizes.iter().sum::<usize>(), 600);
    }

    #[tokio::test]
    async fn test_bytes_arrive_in_order() {
        // Arrange
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut input = StdinInput::from_reader(Cursor::new(data.clone())).unwrap();

        // Act
        let mut seen = Vec::new();
        while let Some(chunk) = input.read_chunk().await.unwrap() {
            seen.extend_from_slice(chunk.as_bytes());
        }

        // Assert
        assert_eq!(seen, data);
    }

    #[tokio::test]
    async fn test_read_error_is_reported_and_reading_continues() {
        // Arrange
        let reader = FlakyReader {
            failed: false,
            inner: Cursor::new(b"after".to_vec()),
        };
        let mut input = StdinInput::from_reader(reader).unwrap();

        // Act
        let first = input.read_chunk().await;
        let second = input.read_chunk().await;

        // Assert
        assert!(first.is_err());
        assert_eq!(second.unwrap().unwrap().as_bytes(), b"after");
    }

    #[tokio::test]
    async fn test_end_of_input_is_sticky() {
        let mut input = StdinInput::from_reader(Cursor::new(Vec::new())).unwrap();
        assert!(input.read_chunk().await.unwrap().is_none());
        // The thread is gone now; later reads still report end of input.
        assert!(input.read_chunk().await.unwrap().is_none());
    }
}
