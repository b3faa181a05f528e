//! In-memory [`Connection`] pair.
//!
//! [`MemoryConnection`] is the server half handed to a session;
//! [`MemoryPeer`] is the client half a test (or an embedding application)
//! drives directly. No sockets or runtimes beyond Tokio channels are
//! involved.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, Mutex};

use crate::{Connection, ConnectionId, Frame, TransportError};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1 << 32);

/// Everything the server half can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A text frame.
    Text(String),
    /// A binary frame.
    Binary(Vec<u8>),
    /// A liveness ping.
    Ping,
    /// A close frame.
    Close,
}

/// Server half of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    inbound: Mutex<mpsc::UnboundedReceiver<Frame>>,
    outbound: mpsc::UnboundedSender<Outgoing>,
}

/// Client half of an in-memory connection.
pub struct MemoryPeer {
    inbound: mpsc::UnboundedSender<Frame>,
    outbound: mpsc::UnboundedReceiver<Outgoing>,
}

impl MemoryConnection {
    /// Creates a connected server/client pair.
    pub fn pair() -> (MemoryConnection, MemoryPeer) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let id = ConnectionId::new(
            NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed),
        );
        (
            MemoryConnection {
                id,
                inbound: Mutex::new(in_rx),
                outbound: out_tx,
            },
            MemoryPeer {
                inbound: in_tx,
                outbound: out_rx,
            },
        )
    }

    fn emit(&self, out: Outgoing) -> Result<(), TransportError> {
        self.outbound
            .send(out)
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.emit(Outgoing::Binary(data.to_vec()))
    }

    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.emit(Outgoing::Text(text.to_owned()))
    }

    async fn recv(&self) -> Result<Option<Frame>, Self::Error> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.emit(Outgoing::Ping)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.emit(Outgoing::Close)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

impl MemoryPeer {
    /// Sends a text payload to the server half.
    pub fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.push(Frame::Data(text.as_bytes().to_vec()))
    }

    /// Answers a ping.
    pub fn send_pong(&self) -> Result<(), TransportError> {
        self.push(Frame::Pong)
    }

    /// Waits for the next frame the server half emitted.
    ///
    /// Returns `None` once the server half has been dropped.
    pub async fn next(&mut self) -> Option<Outgoing> {
        self.outbound.recv().await
    }

    /// Returns the next emitted frame without waiting.
    pub fn try_next(&mut self) -> Option<Outgoing> {
        self.outbound.try_recv().ok()
    }

    /// Hangs up; the server half's `recv` then yields `Ok(None)`.
    pub fn hang_up(self) -> mpsc::UnboundedReceiver<Outgoing> {
        self.outbound
    }

    fn push(&self, frame: Frame) -> Result<(), TransportError> {
        self.inbound.send(frame).map_err(|_| {
            TransportError::ConnectionClosed("server half dropped".into())
        })
    }
}
