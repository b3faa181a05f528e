//! Error types for the room layer.

/// Errors returned to whoever drives a room (the connection handler or a
/// test), never to the player.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The player name is already bound to a room.
    #[error("player {player} is already in room {room}")]
    AlreadyJoined { player: String, room: String },

    /// No room with this name exists.
    #[error("room {0} not found")]
    NotFound(String),

    /// The room's actor has stopped or dropped the request.
    #[error("room {0} is unavailable")]
    Unavailable(String),

    /// The manager is shutting down and accepts no new players.
    #[error("room manager is closed")]
    Closed,
}

/// Errors raised by role hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// The role has no night ability.
    #[error("the {0} role has no night ability")]
    NoAbility(String),
}
