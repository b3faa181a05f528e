//! Wire types exchanged between a client and its room.
//!
//! Inbound frames decode into [`ClientMessage`]; everything the server
//! pushes is a [`ServerEvent`]. Both are plain JSON objects tagged by a
//! `type` field so browser clients can switch on it directly.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The stage of a game round.
///
/// Transitions are strictly sequential:
///
/// ```text
/// Lobby → Night → Day → Vote → Night → …
///            └──────┴─────┴──→ Lobby   (game over)
/// ```
///
/// `Defense` is reserved for a final-plea stage and is never entered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Lobby,
    Night,
    Day,
    Vote,
    Defense,
}

impl Phase {
    /// Returns `true` while a round is being played.
    pub fn is_in_game(&self) -> bool {
        matches!(self, Self::Night | Self::Day | Self::Vote | Self::Defense)
    }

    /// Returns `true` if players may cast votes in this phase.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Day | Self::Vote)
    }

    /// Returns `true` if moving from `self` to `target` is a legal step.
    ///
    /// Any in-game phase may drop back to `Lobby` when the game ends.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Lobby, Self::Night)
            | (Self::Night, Self::Day)
            | (Self::Day, Self::Vote)
            | (Self::Vote, Self::Night) => true,
            (from, Self::Lobby) => from.is_in_game(),
            _ => false,
        }
    }

    /// The lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Night => "night",
            Self::Day => "day",
            Self::Vote => "vote",
            Self::Defense => "defense",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Role alignment, used by the win check and the night-time team channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Citizen,
    Mafia,
    Neutral,
    /// Reserved for a future faction; no role uses it yet.
    Sect,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Citizen => "citizen",
            Self::Mafia => "mafia",
            Self::Neutral => "neutral",
            Self::Sect => "sect",
        })
    }
}

// ---------------------------------------------------------------------------
// ClientMessage — client → server
// ---------------------------------------------------------------------------

/// A command sent by a player.
///
/// Internally tagged: `{"type": "vote", "target": "bob"}`. Unrecognised
/// `type` values decode to [`ClientMessage::Unknown`] rather than failing,
/// so the room can answer them with a notice instead of a format error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Free text for the room (or the mafia channel at night).
    Chat {
        #[serde(default)]
        text: String,
    },
    /// Host asks to begin a game.
    Start,
    /// Day/vote ballot against `target`.
    Vote {
        #[serde(default)]
        target: String,
    },
    /// Night ability aimed at `target`.
    Action {
        #[serde(default)]
        target: String,
    },
    /// Asks for a private phase snapshot (used after reconnecting).
    Sync,
    /// Host-only room management: `kick` a player or `end` the game.
    Admin {
        #[serde(default)]
        action: String,
        #[serde(default)]
        target: String,
    },
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// ServerEvent — server → client
// ---------------------------------------------------------------------------

/// Discriminates what a [`ServerEvent`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// System or narrative line.
    Log,
    /// A message authored by a player.
    Chat,
    /// Phase transition; `phase` holds the new phase.
    Phase,
    /// Private role reveal.
    Role,
    /// Current player listing in join order.
    Roster,
    /// Private snapshot answering `sync`.
    State,
}

/// Snapshot returned to a `sync` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub phase: Phase,
    pub active: bool,
    #[serde(rename = "dayCount")]
    pub day_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Structured half of a private role reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReveal {
    pub role: String,
    pub team: Team,
    pub description: String,
}

/// The `state` payload of a [`ServerEvent`].
///
/// Untagged: the event's `type` already says which shape to expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventState {
    /// Player names in join order.
    Roster(Vec<String>),
    Snapshot(StateSnapshot),
    Role(RoleReveal),
}

/// Every frame the server pushes to a client.
///
/// Optional fields are omitted from the JSON when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<EventState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl ServerEvent {
    fn bare(kind: EventKind, room: &str) -> Self {
        Self {
            kind,
            body: None,
            room: (!room.is_empty()).then(|| room.to_string()),
            phase: None,
            state: None,
            author: None,
        }
    }

    /// A system/narrative line.
    pub fn log(room: &str, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::bare(EventKind::Log, room)
        }
    }

    /// A player-authored chat line.
    pub fn chat(
        room: &str,
        author: &str,
        body: impl Into<String>,
    ) -> Self {
        Self {
            body: Some(body.into()),
            author: Some(author.to_string()),
            ..Self::bare(EventKind::Chat, room)
        }
    }

    /// A phase transition with its narrative line.
    pub fn phase(room: &str, phase: Phase, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            phase: Some(phase),
            ..Self::bare(EventKind::Phase, room)
        }
    }

    /// A private role reveal.
    pub fn role(room: &str, reveal: RoleReveal) -> Self {
        let body = format!(
            "Your role is {}. {}",
            reveal.role, reveal.description
        );
        Self {
            body: Some(body),
            state: Some(EventState::Role(reveal)),
            ..Self::bare(EventKind::Role, room)
        }
    }

    /// The current roster in join order.
    pub fn roster(room: &str, players: Vec<String>) -> Self {
        Self {
            state: Some(EventState::Roster(players)),
            ..Self::bare(EventKind::Roster, room)
        }
    }

    /// A private `sync` reply.
    pub fn snapshot(room: &str, snapshot: StateSnapshot) -> Self {
        Self {
            phase: Some(snapshot.phase),
            state: Some(EventState::Snapshot(snapshot)),
            ..Self::bare(EventKind::State, room)
        }
    }

    /// Body text, or `""` when the event has none.
    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

// =========================================================================
// Tests
// =========================================================================
