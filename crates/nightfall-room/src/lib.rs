//! Rooms for Nightfall.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! game's state. Everything that touches that state, from player input to
//! phase timers, arrives as a command on the room's bounded mailbox and is
//! applied one at a time.
//!
//! # Key types
//!
//! - [`RoomManager`]: registry of rooms and player bindings; routes input
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Role`] / [`RoleKind`]: the closed set of player roles and their hooks
//! - [`GameState`]: per-game state owned by the actor
//! - [`RoomConfig`]: player thresholds, phase durations, role roster

mod config;
mod error;
mod manager;
mod roles;
mod room;
mod state;

pub use config::RoomConfig;
pub use error::{RoleError, RoomError};
pub use manager::RoomManager;
pub use roles::{DeathCause, Role, RoleAssignment, RoleKind, RoleRoom};
pub use room::{RoomHandle, RoomInfo};
pub use state::{GameState, NightPicks, NightSlot, VoteOutcome};
