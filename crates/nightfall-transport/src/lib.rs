//! Transport abstraction layer for Nightfall.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! how a persistent, message-framed, bidirectional connection is obtained.
//! The game engine only ever sees a [`Connection`]; whether it came from a
//! local WebSocket listener, a relay tunnel, or an in-memory pipe is not
//! its concern.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

mod error;
pub mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::{MemoryConnection, MemoryPeer, Outgoing};
#[cfg(feature = "websocket")]
pub use websocket::{
    DEFAULT_HANDSHAKE_TIMEOUT, WebSocketConnection, WebSocketTransport,
};

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single inbound frame as seen by the session layer.
///
/// Liveness replies are surfaced instead of swallowed so the reader can
/// refresh its deadline on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// An application payload (text or binary).
    Data(Vec<u8>),
    /// A reply to one of our liveness pings.
    Pong,
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;

    /// Gracefully shuts down the transport, stopping new connections.
    fn shutdown(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving may happen concurrently from two different tasks,
/// so implementations must not hold one side's lock while waiting on the
/// other.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends binary data to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Sends a text frame to the remote peer.
    ///
    /// Defaults to a binary send of the UTF-8 bytes. Browser-facing
    /// transports should override this so clients receive text frames.
    fn send_text(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.send(text.as_bytes())
    }

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Frame>, Self::Error>> + Send;

    /// Sends a liveness ping. The peer's answer arrives as [`Frame::Pong`].
    fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Closes the connection, sending a close frame where supported.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
