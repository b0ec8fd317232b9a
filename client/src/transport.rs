//! Relay transport.
//!
//! DESIGN
//! ======
//! Sending is fire-and-forget: [`Transport::send`] never blocks and never
//! reports failure to the caller. [`WsTransport`] queues outgoing frames on an
//! unbounded channel drained by a writer task. A reader task decodes inbound
//! messages, keeps only valid `paint` markers, and hands them over on a
//! second channel so the annotator applies them on its own thread.
//!
//! Inbound markers are validated here, before they reach the scene. Invalid
//! ones are logged and dropped.

use frames::{CodecError, ErrorCode, Frame, Marker};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound half of the relay connection.
pub trait Transport {
    /// Queue a frame for delivery. No acknowledgement, no error surfaced.
    fn send(&self, frame: &Frame);
}

/// Wire encoding used for outgoing frames. Inbound frames are accepted in either.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// JSON text messages.
    #[default]
    Text,
    /// Protobuf binary messages.
    Binary,
}

impl Encoding {
    /// Encode `frame` as a websocket message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if the payload cannot be serialized as text.
    pub fn encode(self, frame: &Frame) -> Result<Message, CodecError> {
        match self {
            Self::Text => Ok(Message::Text(frames::encode_text(frame)?.into())),
            Self::Binary => Ok(Message::Binary(frames::encode_frame(frame).into())),
        }
    }
}

/// Error type for client connection setup.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The relay URL is not a `ws://` or `wss://` URL.
    #[error("invalid relay url: {0}")]
    InvalidUrl(String),
    /// The websocket connection or handshake failed.
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
}

impl ErrorCode for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "E_CLIENT_URL",
            Self::WsConnect(_) => "E_CLIENT_CONNECT",
        }
    }
}

/// Websocket connection to the relay.
pub struct WsTransport {
    tx: mpsc::UnboundedSender<Message>,
    encoding: Encoding,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl WsTransport {
    /// Connect to the relay at `url`.
    ///
    /// Returns the transport and the receiver of validated remote markers, in
    /// arrival order. The receiver closes when the connection ends.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] for non-websocket URLs and
    /// [`ClientError::WsConnect`] if the handshake fails.
    pub async fn connect(
        url: &str,
        encoding: Encoding,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Marker>), ClientError> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ClientError::InvalidUrl(url.to_owned()));
        }

        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::WsConnect(Box::new(e)))?;
        info!(%url, ?encoding, "connected to relay");

        let (sink, stream) = stream.split();
        let (tx, out_rx) = mpsc::unbounded_channel();
        let (marker_tx, marker_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(write_loop(sink, out_rx));
        let reader = tokio::spawn(read_loop(stream, marker_tx));

        Ok((Self { tx, encoding, writer, reader }, marker_rx))
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Whether the writer task is still accepting frames.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Flush queued frames, close the socket, and stop the reader.
    pub async fn shutdown(self) {
        let Self { tx, writer, reader, .. } = self;
        drop(tx);
        if let Err(e) = writer.await {
            warn!(error = %e, "writer task failed");
        }
        reader.abort();
    }
}

impl Transport for WsTransport {
    fn send(&self, frame: &Frame) {
        let msg = match self.encoding.encode(frame) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "dropping unencodable frame");
                return;
            }
        };
        if self.tx.send(msg).is_err() {
            debug!(event = %frame.event, "connection closed; frame dropped");
        }
    }
}

async fn write_loop(mut sink: SplitSink<WsStream, Message>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = sink.send(msg).await {
            warn!(error = %e, "relay send failed");
            return;
        }
    }
    let _ = sink.close().await;
}

async fn read_loop(mut stream: SplitStream<WsStream>, markers: mpsc::UnboundedSender<Marker>) {
    while let Some(msg) = stream.next().await {
        let decoded = match msg {
            Ok(Message::Text(text)) => frames::decode_text(&text),
            Ok(Message::Binary(bytes)) => frames::decode_frame(&bytes),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "relay receive failed");
                break;
            }
        };

        if let Some(marker) = accept_remote(decoded) {
            if markers.send(marker).is_err() {
                break;
            }
        }
    }
    info!("relay connection closed");
}

/// Keep a decoded inbound frame only if it is a valid `paint` marker.
pub(crate) fn accept_remote(decoded: Result<Frame, CodecError>) -> Option<Marker> {
    let frame = match decoded {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "dropping undecodable relay message");
            return None;
        }
    };

    if !frame.is_paint() {
        debug!(event = %frame.event, "ignoring unknown event");
        return None;
    }

    match frame.marker() {
        Ok(marker) => Some(marker),
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "dropping invalid remote marker");
            None
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
