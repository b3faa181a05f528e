//! Room configuration.

use std::time::Duration;

use nightfall_session::OverflowPolicy;
use serde::{Deserialize, Serialize};

use crate::RoleKind;

/// Settings shared by every room a manager creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum players required to start a game.
    pub min_players: usize,

    /// From this many players on, two mafia are dealt instead of one.
    pub two_mafia_from: usize,

    /// How long the mafia, doctor and detective have to act.
    pub night_duration: Duration,

    /// Open discussion before voting starts.
    pub day_duration: Duration,

    /// How long the execution vote stays open.
    pub vote_duration: Duration,

    /// Capacity of each room's command mailbox.
    pub mailbox_capacity: usize,

    /// What a full command mailbox does with new commands.
    #[serde(skip)]
    pub mailbox_policy: OverflowPolicy,

    /// Roles dealt after the mafia, in order, while slots remain. Every
    /// remaining player becomes a citizen.
    pub special_roles: Vec<RoleKind>,

    /// Fixed seed for role shuffling. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            two_mafia_from: 7,
            night_duration: Duration::from_secs(25),
            day_duration: Duration::from_secs(40),
            vote_duration: Duration::from_secs(15),
            mailbox_capacity: 256,
            mailbox_policy: OverflowPolicy::DropOldest,
            special_roles: vec![RoleKind::Doctor, RoleKind::Detective],
            rng_seed: None,
        }
    }
}

impl RoomConfig {
    /// Number of mafia dealt to a table of `players`.
    pub fn mafia_count(&self, players: usize) -> usize {
        if players < self.two_mafia_from { 1 } else { 2 }
    }

    /// The unshuffled role queue for a table of `players`.
    ///
    /// Mafia first, then each special role while slots remain, then
    /// citizens up to `players`.
    pub fn role_queue(&self, players: usize) -> Vec<RoleKind> {
        let mut queue = Vec::with_capacity(players);
        let mafia = self.mafia_count(players).min(players);
        queue.extend(std::iter::repeat_n(RoleKind::Mafia, mafia));
        for kind in &self.special_roles {
            if queue.len() >= players {
                break;
            }
            queue.push(*kind);
        }
        while queue.len() < players {
            queue.push(RoleKind::Citizen);
        }
        queue
    }

    /// How long `phase` lasts, or `None` for phases without a timer.
    pub fn phase_duration(
        &self,
        phase: nightfall_protocol::Phase,
    ) -> Option<Duration> {
        use nightfall_protocol::Phase;
        match phase {
            Phase::Night => Some(self.night_duration),
            Phase::Day => Some(self.day_duration),
            Phase::Vote => Some(self.vote_duration),
            Phase::Lobby | Phase::Defense => None,
        }
    }
}
