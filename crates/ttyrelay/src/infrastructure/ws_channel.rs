//! WebSocket implementation of the remote duplex channel.
//!
//! [`connect`] performs the HTTP upgrade (with the BBS credential headers)
//! and splits the resulting stream into a [`WsFrameSource`] and a
//! [`WsFrameSink`], which the inbound worker and the coordinator own
//! separately.
//!
//! # Message mapping
//!
//! | WebSocket message | Relay view                        |
//! |-------------------|-----------------------------------|
//! | Text / Binary     | Data frame, payload bytes as-is   |
//! | Ping / Pong       | skipped (tungstenite replies)     |
//! | Close / EOF       | `ConnectionError::Closed`         |
//!
//! Each outbound Data frame becomes exactly one text-opcode WebSocket frame
//! whose payload is the chunk's bytes as read.  The frame is built directly
//! rather than through `Message::Text`, which only holds a `String`: a read
//! can stop in the middle of a multi-byte character, and those bytes must
//! still go out unchanged and without delay.

use anyhow::Context;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::frame::coding::{CloseCode, Data, OpCode};
use tokio_tungstenite::tungstenite::protocol::frame::Frame as WireFrame;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::application::ports::{FrameSink, FrameSource};
use crate::domain::{ConnectionError, Frame, FrameKind, RelayConfig, NORMAL_CLOSURE};

/// The client stream produced by [`connect`].
pub type ClientStream = MaybeTlsStream<TcpStream>;

/// Receive half of a WebSocket connection.
pub struct WsFrameSource<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

/// Send half of a WebSocket connection.
pub struct WsFrameSink<S> {
    sink: SplitSink<WebSocketStream<S>, WsMessage>,
}

/// Builds the upgrade request for `config.url` with the credential headers.
///
/// # Errors
///
/// Returns an error if the URL is not a valid WebSocket URL or a credential
/// contains bytes that are not allowed in an HTTP header value.
pub fn build_request(config: &RelayConfig) -> anyhow::Result<Request> {
    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .with_context(|| format!("invalid WebSocket URL: '{}'", config.url))?;

    for (name, value) in config.auth.headers() {
        let header = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name {name}"))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header {name}"))?;
        request.headers_mut().insert(header, value);
    }

    Ok(request)
}

/// Connects to `config.url` and splits the connection into its two halves.
///
/// # Errors
///
/// Returns an error if the request cannot be built, or if the TCP connect,
/// TLS handshake, or WebSocket upgrade fails (including the server rejecting
/// the credentials).
pub async fn connect(
    config: &RelayConfig,
) -> anyhow::Result<(WsFrameSource<ClientStream>, WsFrameSink<ClientStream>)> {
    let request = build_request(config)?;

    info!("connecting to {}", config.url);
    let (ws_stream, response) = connect_async(request)
        .await
        .with_context(|| format!("dial {}", config.url))?;
    debug!("WebSocket handshake complete: HTTP {}", response.status());

    Ok(split(ws_stream))
}

/// Splits an established WebSocket stream into relay channel halves.
pub fn split<S>(ws_stream: WebSocketStream<S>) -> (WsFrameSource<S>, WsFrameSink<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (sink, stream) = ws_stream.split();
    (
        WsFrameSource { stream },
        WsFrameSink { sink },
    )
}

#[async_trait]
impl<S> FrameSource for WsFrameSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn receive_frame(&mut self) -> Result<Frame, ConnectionError> {
        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => return Err(connection_error(e)),
                None => return Err(ConnectionError::Closed),
            };

            match message {
                WsMessage::Text(text) => return Ok(Frame::data(text.into_bytes())),
                WsMessage::Binary(bytes) => return Ok(Frame::data(bytes)),
                WsMessage::Close(close) => {
                    debug!("remote sent close frame: {close:?}");
                    return Err(ConnectionError::Closed);
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }
        }
    }
}

#[async_trait]
impl<S> FrameSink for WsFrameSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_frame(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        let message = match frame.kind() {
            FrameKind::Data => text_message(frame.into_payload()),
            FrameKind::Close => WsMessage::Close(Some(CloseFrame {
                code: CloseCode::from(NORMAL_CLOSURE),
                reason: "".into(),
            })),
        };

        self.sink.send(message).await.map_err(connection_error)
    }
}

/// One final text frame carrying `payload` byte for byte.
fn text_message(payload: Vec<u8>) -> WsMessage {
    WsMessage::Frame(WireFrame::message(payload, OpCode::Data(Data::Text), true))
}

fn connection_error(error: WsError) -> ConnectionError {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => ConnectionError::Closed,
        other => ConnectionError::Transport(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
