//! Wire protocol for Nightfall.
//!
//! - **Types** ([`ClientMessage`], [`ServerEvent`], [`Phase`], [`Team`]):
//!   the JSON objects exchanged with browser clients.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those objects are
//!   turned into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, EventKind, EventState, Phase, RoleReveal, ServerEvent,
    StateSnapshot, Team,
};
