//! Client sessions for Nightfall.
//!
//! A [`ClientSession`] is the server's handle on one connected player:
//! their display name, a bounded outbound [`Mailbox`], and the room they
//! are currently in. [`run`] drives a live [`Connection`] with two
//! workers: a reader that decodes frames and hands them to a [`Router`],
//! and a writer that drains the mailbox and keeps the connection alive
//! with pings.
//!
//! ```text
//! Connection ──read worker──→ Router (room manager) ──→ room actor
//!     ↑                                                    │
//!     └──write worker←── Mailbox<ServerEvent> ←──push──────┘
//! ```
//!
//! [`Connection`]: nightfall_transport::Connection

mod error;
mod mailbox;
mod session;
mod worker;

pub use error::SessionError;
pub use mailbox::{Mailbox, OverflowPolicy, PushOutcome};
pub use session::{ClientSession, Router, SessionConfig};
pub use worker::run;
