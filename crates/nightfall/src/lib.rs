//! # Nightfall
//!
//! Server for a room-based mafia game played over WebSockets.
//!
//! Clients connect to `ws://host/ws?room=<room>&user=<name>`. Each room is
//! an actor that owns one game: night actions, day discussion, execution
//! votes, and the roles that bend those rules.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nightfall::prelude::*;
//!
//! # async fn start() -> Result<(), NightfallError> {
//! let server = NightfallServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::NightfallError;
pub use server::{NightfallServer, NightfallServerBuilder};

/// Re-exports for building and configuring a server.
pub mod prelude {
    pub use crate::{NightfallError, NightfallServer, NightfallServerBuilder};
    pub use nightfall_protocol::{
        ClientMessage, EventKind, EventState, Phase, ServerEvent, Team,
    };
    pub use nightfall_room::{RoleKind, RoomConfig, RoomInfo, RoomManager};
    pub use nightfall_session::SessionConfig;
}
