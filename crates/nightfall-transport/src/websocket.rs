//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! The upgrade request must carry `room` and `user` query parameters
//! (`ws://host/ws?room=R1&user=alice`); requests without them are refused
//! with `400 Bad Request` before the upgrade completes.
//!
//! The upgrade runs inside [`Transport::accept`], so a peer that opens a
//! socket and never speaks is cut off after the handshake timeout instead
//! of stalling the accept loop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Frame, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How long a peer gets to finish the upgrade request by default.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }

    /// Caps how long [`Transport::accept`] waits for an upgrade request.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let mut params: Option<Result<JoinParams, TransportError>> = None;
        let callback = |req: &Request, resp: Response| {
            let parsed = JoinParams::from_query(req.uri().query());
            let outcome = match &parsed {
                Ok(_) => Ok(resp),
                Err(e) => {
                    let mut err = ErrorResponse::new(Some(e.to_string()));
                    *err.status_mut() = StatusCode::BAD_REQUEST;
                    Err(err)
                }
            };
            params = Some(parsed);
            outcome
        };

        let handshake = tokio::time::timeout(
            self.handshake_timeout,
            tokio_tungstenite::accept_hdr_async(stream, callback),
        )
        .await;
        let ws = match handshake {
            Ok(Ok(ws)) => ws,
            Err(_) => {
                tracing::debug!(%addr, "WebSocket handshake timed out");
                return Err(TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "handshake timed out",
                )));
            }
            Ok(Err(e)) => {
                // A refused upgrade surfaces as a handshake error; report
                // the parameter problem rather than the generic one.
                if let Some(Err(refused)) = params {
                    return Err(refused);
                }
                return Err(TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                )));
            }
        };
        let params =
            params.unwrap_or(Err(TransportError::MissingParameter("room")))?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(
            %id, %addr, room = %params.room, user = %params.user,
            "accepted WebSocket connection"
        );

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            room: params.room,
            user: params.user,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The two values every upgrade request must carry.
struct JoinParams {
    room: String,
    user: String,
}

impl JoinParams {
    fn from_query(query: Option<&str>) -> Result<Self, TransportError> {
        let mut room = None;
        let mut user = None;
        for (key, value) in
            url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "room" => room = Some(value.to_string()),
                "user" => user = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(Self {
            room: room.ok_or(TransportError::MissingParameter("room"))?,
            user: user.ok_or(TransportError::MissingParameter("user"))?,
        })
    }
}

/// A single WebSocket connection.
///
/// The socket is split so the session's read and write workers never wait
/// on each other's lock.
pub struct WebSocketConnection {
    id: ConnectionId,
    room: String,
    user: String,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// The room name requested in the upgrade URL.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// The display name requested in the upgrade URL.
    pub fn user(&self) -> &str {
        &self.user
    }

    async fn write(&self, msg: Message) -> Result<(), TransportError> {
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.write(Message::Binary(data.to_vec().into())).await
    }

    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.write(Message::Text(text.to_owned().into())).await
    }

    async fn recv(&self) -> Result<Option<Frame>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(Frame::Data(data.into())));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(Frame::Data(text.as_bytes().to_vec())));
                }
                Some(Ok(Message::Pong(_))) => return Ok(Some(Frame::Pong)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.write(Message::Ping(Vec::new().into())).await
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
