//! Frame and input-chunk types exchanged between the relay workers.
//!
//! A [`Frame`] is the unit that crosses the remote channel in either
//! direction.  The relay never looks inside the payload: bytes that arrive
//! from the remote are written to the terminal untouched, and bytes typed on
//! the terminal are shipped out untouched.
//!
//! ```text
//! terminal ──InputChunk──▶ OutboundReader ──▶ coordinator ──Frame::data──▶ remote
//! terminal ◀──payload──── InboundReader ◀──────────────────Frame::data─── remote
//!                                            coordinator ──Frame::close─▶ remote
//! ```

/// Maximum number of bytes captured from the local input device per read.
pub const READ_CHUNK_SIZE: usize = 256;

/// WebSocket status code for a normal, operator-initiated closure (RFC 6455 §7.4.1).
pub const NORMAL_CLOSURE: u16 = 1000;

/// Discriminates the two kinds of frame the relay produces or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Opaque application payload.
    Data,
    /// Graceful-close indicator.  Always empty; at most one is ever sent and
    /// it is always the last frame on the channel.
    Close,
}

/// One discrete unit of data on the duplex channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    payload: Vec<u8>,
}

impl Frame {
    /// Builds a data frame carrying `payload` verbatim.
    pub fn data(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: FrameKind::Data,
            payload: payload.into(),
        }
    }

    /// Builds the graceful-close frame (normal closure, empty payload).
    pub fn close() -> Self {
        Self {
            kind: FrameKind::Close,
            payload: Vec::new(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn is_close(&self) -> bool {
        self.kind == FrameKind::Close
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the frame and returns its payload bytes.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Bytes captured from the local input device by a single read.
///
/// Chunks are forwarded in capture order, one Data frame per chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChunk(Vec<u8>);

impl InputChunk {
    /// Wraps bytes read from the input device.
    ///
    /// Callers read into a [`READ_CHUNK_SIZE`] buffer, so chunks built by the
    /// relay never exceed that size; the constructor does not re-check it.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turns the chunk into the outbound Data frame that carries it.
    pub fn into_frame(self) -> Frame {
        Frame::data(self.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_frame_keeps_payload_verbatim() {
        // Arrange: bytes that are not valid UTF-8 must survive untouched
        let bytes = vec![0x1b, b'[', b'A', 0xff, 0x00];

        // Act
        let frame = Frame::data(bytes.clone());

        // Assert
        assert_eq!(frame.kind(), FrameKind::Data);
        assert_eq!(frame.payload(), bytes.as_slice());
        assert!(!frame.is_close());
    }

    #[test]
    fn test_close_frame_is_empty() {
        let frame = Frame::close();
        assert!(frame.is_close());
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_input_chunk_becomes_data_frame() {
        // Arrange
        let chunk = InputChunk::new(b"ls -la\r".to_vec());

        // Act
        let frame = chunk.into_frame();

        // Assert
        assert_eq!(frame, Frame::data(b"ls -la\r".to_vec()));
    }

    #[test]
    fn test_input_chunk_length() {
        let chunk = InputChunk::new(vec![b'x'; READ_CHUNK_SIZE]);
        assert_eq!(chunk.len(), READ_CHUNK_SIZE);
        assert!(!chunk.is_empty());
        assert!(InputChunk::new(Vec::new()).is_empty());
    }
}
