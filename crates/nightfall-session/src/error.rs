//! Error types for the session layer.

use std::time::Duration;

/// Why a session's connection workers stopped.
///
/// None of these are surfaced to the player; they end up in a log line
/// and the session is torn down as an implicit leave.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Nothing (not even a pong) arrived within the read deadline.
    #[error("no frame received within {0:?}")]
    ReadTimeout(Duration),

    /// A single write did not complete within the write deadline.
    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    /// The peer sent a frame larger than the configured limit.
    #[error("frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    /// The underlying connection failed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An outbound event could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] nightfall_protocol::ProtocolError),

    /// The router that owned this session has been dropped.
    #[error("router is gone")]
    RouterGone,
}

impl SessionError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }
}
