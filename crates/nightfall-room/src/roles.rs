//! Player roles and their hooks.
//!
//! The role set is closed: [`RoleKind`] names every role, and each hook on
//! [`Role`] is an exhaustive match over it. Roles never see the room actor;
//! they act through the narrow [`RoleRoom`] interface so they can be
//! exercised against a plain in-memory fake.

use std::fmt;

use nightfall_protocol::{RoleReveal, Team};
use serde::{Deserialize, Serialize};

use crate::{NightSlot, RoleError};

// ---------------------------------------------------------------------------
// RoleRoom
// ---------------------------------------------------------------------------

/// What a role may see and do inside its room.
pub trait RoleRoom {
    fn room_name(&self) -> &str;

    fn is_alive(&self, name: &str) -> bool;

    /// Private system line to one player.
    fn send_private(&self, to: &str, body: String);

    /// System line to everyone in the room.
    fn broadcast(&self, body: String);

    /// System line to every player holding a role on `team`.
    fn broadcast_team(&self, team: Team, body: String);

    fn set_night_pick(&mut self, slot: NightSlot, target: &str);

    fn night_pick(&self, slot: NightSlot) -> Option<&str>;

    /// The role dealt to `name` this game.
    fn role_of(&self, name: &str) -> Option<&Role>;

    fn meta(&self, key: &str) -> Option<&str>;

    fn set_meta(&mut self, key: &str, value: &str);

    /// Adds `weight` to `target`'s tally in the current vote.
    fn add_vote(&mut self, target: &str, weight: u32);
}

// ---------------------------------------------------------------------------
// RoleKind
// ---------------------------------------------------------------------------

/// Every role the game knows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Mafia,
    Doctor,
    Detective,
    Soldier,
    Politician,
    Citizen,
}

impl RoleKind {
    pub const ALL: [RoleKind; 6] = [
        Self::Mafia,
        Self::Doctor,
        Self::Detective,
        Self::Soldier,
        Self::Politician,
        Self::Citizen,
    ];

    /// Looks a role up by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mafia => "mafia",
            Self::Doctor => "doctor",
            Self::Detective => "detective",
            Self::Soldier => "soldier",
            Self::Politician => "politician",
            Self::Citizen => "citizen",
        }
    }

    pub fn team(&self) -> Team {
        match self {
            Self::Mafia => Team::Mafia,
            _ => Team::Citizen,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Mafia => {
                "Each night, pick a player to eliminate. You can talk with \
                 the other mafia at night."
            }
            Self::Doctor => {
                "Each night, pick a player to protect from the mafia."
            }
            Self::Detective => {
                "Each night, investigate a player to learn whether they \
                 are mafia."
            }
            Self::Soldier => "You survive the first attack against you.",
            Self::Politician => {
                "You cannot be executed by vote, and your vote counts twice."
            }
            Self::Citizen => {
                "No ability, but your voice and vote can root out the mafia."
            }
        }
    }

    /// The standard metadata dealt with this role.
    pub fn assignment(&self) -> RoleAssignment {
        RoleAssignment {
            name: self.name().to_string(),
            team: self.team(),
            description: self.description().to_string(),
        }
    }

    pub fn has_night_ability(&self) -> bool {
        matches!(self, Self::Mafia | Self::Doctor | Self::Detective)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The metadata a role is built from. Fixed for the whole game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub name: String,
    pub team: Team,
    pub description: String,
}

/// Why a player is about to die.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Mafia,
    Vote,
}

impl DeathCause {
    /// Past-tense phrase used in the public announcement.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Mafia => "was killed by the mafia",
            Self::Vote => "was executed by vote",
        }
    }
}

/// A role dealt to one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    kind: RoleKind,
    assignment: RoleAssignment,
}

impl Role {
    /// Creates a role with its standard metadata.
    pub fn new(kind: RoleKind) -> Self {
        Self::from_assignment(kind.assignment())
    }

    /// Builds a role from metadata, choosing behaviour by name.
    ///
    /// Unknown names behave as citizens but keep their metadata, so a
    /// misconfigured role never breaks a game.
    pub fn from_assignment(assignment: RoleAssignment) -> Self {
        let kind =
            RoleKind::from_name(&assignment.name).unwrap_or(RoleKind::Citizen);
        Self { kind, assignment }
    }

    pub fn kind(&self) -> RoleKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.assignment.name
    }

    pub fn team(&self) -> Team {
        self.assignment.team
    }

    pub fn description(&self) -> &str {
        &self.assignment.description
    }

    pub fn assignment(&self) -> &RoleAssignment {
        &self.assignment
    }

    /// The private reveal sent when roles are dealt.
    pub fn reveal(&self) -> RoleReveal {
        RoleReveal {
            role: self.assignment.name.clone(),
            team: self.assignment.team,
            description: self.assignment.description.clone(),
        }
    }

    // -- hooks --------------------------------------------------------------

    /// Uses the role's night ability on `target`.
    ///
    /// The caller has already checked the phase and that both players are
    /// alive.
    pub fn night_action(
        &self,
        room: &mut dyn RoleRoom,
        actor: &str,
        target: &str,
    ) -> Result<(), RoleError> {
        match self.kind {
            RoleKind::Mafia => {
                room.set_night_pick(NightSlot::Mafia, target);
                room.send_private(actor, format!("You chose {target}."));
                room.broadcast_team(
                    Team::Mafia,
                    format!("The mafia is targeting {target}."),
                );
            }
            RoleKind::Doctor => {
                room.set_night_pick(NightSlot::Doctor, target);
                room.send_private(
                    actor,
                    format!("You will protect {target} tonight."),
                );
            }
            RoleKind::Detective => {
                room.set_night_pick(NightSlot::Detective, target);
                room.send_private(
                    actor,
                    format!("You are investigating {target}."),
                );
            }
            RoleKind::Soldier | RoleKind::Politician | RoleKind::Citizen => {
                return Err(RoleError::NoAbility(self.name().to_string()));
            }
        }
        Ok(())
    }

    /// Runs after `voter` (holding this role) cast one vote for `target`.
    pub fn on_vote(&self, room: &mut dyn RoleRoom, voter: &str, target: &str) {
        if self.kind == RoleKind::Politician {
            room.add_vote(target, 1);
            tracing::debug!(
                room = %room.room_name(), %voter, %target,
                "politician vote doubled"
            );
        }
    }

    /// Runs before `victim` (holding this role) dies.
    ///
    /// Returns `true` if the death is absorbed and the victim stays alive.
    pub fn on_death(
        &self,
        room: &mut dyn RoleRoom,
        victim: &str,
        cause: DeathCause,
    ) -> bool {
        match (self.kind, cause) {
            (RoleKind::Soldier, _) => {
                let key = format!("soldier_survived:{victim}");
                if room.meta(&key).is_some() {
                    return false;
                }
                room.set_meta(&key, "used");
                room.send_private(
                    victim,
                    "You survived an attack. The next one will be fatal."
                        .to_string(),
                );
                room.broadcast(format!("{victim} survived an attack!"));
                true
            }
            (RoleKind::Politician, DeathCause::Vote) => {
                room.send_private(
                    victim,
                    "You cannot be executed by vote.".to_string(),
                );
                room.broadcast(
                    "A politician cannot be executed by vote.".to_string(),
                );
                true
            }
            _ => false,
        }
    }

    /// Runs once the night's picks are applied, for every holder who was
    /// alive when the night ended. A holder killed at dawn still hears
    /// back.
    pub fn on_night_resolved(&self, room: &mut dyn RoleRoom, holder: &str) {
        if self.kind != RoleKind::Detective {
            return;
        }
        let Some(target) = room.night_pick(NightSlot::Detective) else {
            return;
        };
        let is_mafia = room
            .role_of(target)
            .is_some_and(|role| role.team() == Team::Mafia);
        let verdict = if is_mafia { "is" } else { "is not" };
        let body = format!("{target} {verdict} mafia.");
        room.send_private(holder, body);
    }

    /// Runs for every living holder when a day begins. No role reacts to
    /// dawn yet.
    pub fn on_day_start(&self, _room: &mut dyn RoleRoom, _holder: &str) {}
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
