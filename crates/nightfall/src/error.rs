//! Unified error type for the Nightfall server.

use nightfall_protocol::ProtocolError;
use nightfall_room::RoomError;
use nightfall_session::SessionError;
use nightfall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum NightfallError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session ended abnormally (timeout, oversize frame, socket error).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A join was refused (duplicate player, shutdown).
    #[error(transparent)]
    Room(#[from] RoomError),
}
