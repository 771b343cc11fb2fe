//! Remote → terminal worker.
//!
//! Pulls frames off the [`FrameSource`] and writes their payload to local
//! output exactly as received: no framing, no newline translation, no
//! decoding.  The first receive error ends the worker and raises the
//! [`TerminationSignal`]; there is no reconnection, so a failed receive is
//! never treated as transient.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::application::ports::FrameSource;
use crate::domain::{ConnectionError, TerminationSignal};

/// Copies inbound frame payloads to local output until the remote goes away.
pub struct InboundReader<S, W> {
    source: S,
    output: W,
    termination: TerminationSignal,
}

impl<S, W> InboundReader<S, W>
where
    S: FrameSource,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(source: S, output: W, termination: TerminationSignal) -> Self {
        Self {
            source,
            output,
            termination,
        }
    }

    /// Runs the receive loop.
    ///
    /// Returns the receive error that ended the session, after the
    /// termination signal has been raised.
    pub async fn run(&mut self) -> ConnectionError {
        loop {
            let frame = match self.source.receive_frame().await {
                Ok(frame) => frame,
                Err(e) => {
                    info!("read: {e}");
                    if !self.termination.raise() {
                        debug!("termination already signalled");
                    }
                    return e;
                }
            };

            let payload = frame.payload();
            debug!("remote → terminal: {} bytes", payload.len());

            // A broken local output does not mean the remote is gone; keep
            // draining the channel so the session ends on the remote's terms.
            if let Err(e) = self.write_payload(payload).await {
                warn!("failed to write to local output: {e}");
            }
        }
    }

    async fn write_payload(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.output.write_all(payload).await?;
        self.output.flush().await
    }

    /// Consumes the reader and hands back its output.
    pub fn into_output(self) -> W {
        self.output
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFrameSource;
    use crate::domain::Frame;
    use mockall::Sequence;

    /// Builds a source that yields `payloads` as data frames, then fails with
    /// `ConnectionError::Closed`.
    fn source_yielding(payloads: &[&'static [u8]]) -> MockFrameSource {
        let mut source = MockFrameSource::new();
        let mut seq = Sequence::new();
        for payload in payloads {
            let payload = *payload;
            source
                .expect_receive_frame()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || Ok(Frame::data(payload)));
        }
        source
            .expect_receive_frame()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(ConnectionError::Closed));
        source
    }

    #[tokio::test]
    async fn test_hello_payload_is_written_verbatim() {
        // Arrange: the scripted output panics on drop unless it saw exactly
        // the expected writes
        let output = tokio_test::io::Builder::new().write(b"hello").build();
        let mut reader = InboundReader::new(
            source_yielding(&[b"hello"]),
            output,
            TerminationSignal::new(),
        );

        // Act
        reader.run().await;

        // Assert: exactly five bytes reached the terminal
        drop(reader.into_output());
    }

    #[tokio::test]
    async fn test_payloads_pass_through_without_transformation() {
        // Arrange: control sequences, bare LF and invalid UTF-8
        let frames: [&'static [u8]; 3] = [b"\x1b[2J\x1b[H", b"line\n", &[0xc3, 0x28, 0xff]];
        let mut reader = InboundReader::new(
            source_yielding(&frames),
            Vec::<u8>::new(),
            TerminationSignal::new(),
        );

        // Act
        reader.run().await;

        // Assert
        assert_eq!(reader.into_output(), frames.concat());
    }

    #[tokio::test]
    async fn test_output_write_failure_is_skipped_and_next_frame_written() {
        // Arrange: the first write fails, the second must still happen; the
        // source only ends after both frames were delivered
        let output = tokio_test::io::Builder::new()
            .write_error(std::io::Error::other("terminal gone"))
            .write(b"next")
            .build();
        let signal = TerminationSignal::new();
        let mut reader = InboundReader::new(
            source_yielding(&[b"lost", b"next"]),
            output,
            signal.clone(),
        );

        // Act
        let error = reader.run().await;

        // Assert: the loop ended on the receive error, not the write error
        assert!(matches!(error, ConnectionError::Closed));
        assert!(signal.is_raised());
        drop(reader.into_output());
    }

    #[tokio::test]
    async fn test_receive_error_raises_termination_signal() {
        // Arrange
        let signal = TerminationSignal::new();
        let mut reader = InboundReader::new(source_yielding(&[]), Vec::<u8>::new(), signal.clone());

        // Act
        let error = reader.run().await;

        // Assert
        assert!(matches!(error, ConnectionError::Closed));
        assert!(signal.is_raised());
        assert!(reader.into_output().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        // Arrange: one failure; a second receive would violate `times(1)`
        let mut source = MockFrameSource::new();
        source
            .expect_receive_frame()
            .times(1)
            .returning(|| Err(ConnectionError::Transport("reset by peer".to_string())));
        let signal = TerminationSignal::new();
        let mut reader = InboundReader::new(source, Vec::<u8>::new(), signal.clone());

        // Act
        let error = reader.run().await;

        // Assert
        assert!(matches!(error, ConnectionError::Transport(_)));
        assert!(signal.is_raised());
    }

    #[tokio::test]
    async fn test_already_raised_signal_stays_raised() {
        // Arrange: someone else raised the signal first
        let signal = TerminationSignal::new();
        assert!(signal.raise());
        let mut reader = InboundReader::new(source_yielding(&[]), Vec::<u8>::new(), signal.clone());

        // Act
        reader.run().await;

        // Assert: raising again is a no-op, the signal is simply still up
        assert!(signal.is_raised());
        assert!(!signal.raise());
    }
}
