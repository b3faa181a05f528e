//! Per-game state owned by a room actor.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use nightfall_protocol::{Phase, Team};

use crate::Role;

/// Which night ability a pick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NightSlot {
    Mafia,
    Doctor,
    Detective,
}

/// Targets chosen during the current night. The last pick wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightPicks {
    pub mafia: Option<String>,
    pub doctor: Option<String>,
    pub detective: Option<String>,
}

impl NightPicks {
    pub fn get(&self, slot: NightSlot) -> Option<&str> {
        match slot {
            NightSlot::Mafia => self.mafia.as_deref(),
            NightSlot::Doctor => self.doctor.as_deref(),
            NightSlot::Detective => self.detective.as_deref(),
        }
    }

    pub fn set(&mut self, slot: NightSlot, target: &str) {
        let target = Some(target.to_string());
        match slot {
            NightSlot::Mafia => self.mafia = target,
            NightSlot::Doctor => self.doctor = target,
            NightSlot::Detective => self.detective = target,
        }
    }
}

/// How a voting round came out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Nobody voted.
    NoVotes,
    /// Two or more targets share the highest tally, sorted by name.
    Tie(Vec<String>),
    /// One target holds the strict maximum.
    Elected(String),
}

/// Everything that belongs to one game and is cleared when it ends.
///
/// `alive` and `assign` are only populated while `active` is set; `vote`
/// and `voted` only during Day and Vote.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub active: bool,
    pub phase: Phase,
    pub day_count: u32,
    pub alive: BTreeSet<String>,
    pub assign: BTreeMap<String, Role>,
    /// Target name → tally for the current voting round.
    pub vote: BTreeMap<String, u32>,
    /// Players who already voted this round.
    pub voted: HashSet<String>,
    pub picks: NightPicks,
    /// One-shot flags kept by roles, e.g. a soldier's spent survival.
    pub meta: HashMap<String, String>,
}

impl GameState {
    /// Back to the zero value: inactive, in the lobby.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clears tallies and who has voted.
    pub fn reset_votes(&mut self) {
        self.vote.clear();
        self.voted.clear();
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.alive.contains(name)
    }

    /// Living players as `(mafia, everyone else)`.
    pub fn living_by_side(&self) -> (usize, usize) {
        self.alive.iter().fold((0, 0), |(mafia, others), name| {
            let on_mafia = self
                .assign
                .get(name)
                .is_some_and(|role| role.team() == Team::Mafia);
            if on_mafia {
                (mafia + 1, others)
            } else {
                (mafia, others + 1)
            }
        })
    }

    /// The winning side, if the game is decided.
    ///
    /// Citizens win once no mafia is alive; the mafia wins once it is at
    /// least as numerous as everyone else.
    pub fn winner(&self) -> Option<Team> {
        let (mafia, others) = self.living_by_side();
        if mafia == 0 {
            Some(Team::Citizen)
        } else if mafia >= others {
            Some(Team::Mafia)
        } else {
            None
        }
    }

    /// Tallies the current round. Ties at the top are never broken.
    pub fn vote_outcome(&self) -> VoteOutcome {
        let Some(max) = self.vote.values().copied().max() else {
            return VoteOutcome::NoVotes;
        };
        if max == 0 {
            return VoteOutcome::NoVotes;
        }
        // BTreeMap iteration keeps the leaders in name order.
        let mut leaders: Vec<String> = self
            .vote
            .iter()
            .filter(|(_, tally)| **tally == max)
            .map(|(name, _)| name.clone())
            .collect();
        if leaders.len() == 1 {
            VoteOutcome::Elected(leaders.remove(0))
        } else {
            VoteOutcome::Tie(leaders)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleKind;

    fn game(players: &[(&str, RoleKind)]) -> GameState {
        let mut state = GameState {
            active: true,
            phase: Phase::Night,
            ..GameState::default()
        };
        for (name, kind) in players {
            state.alive.insert(name.to_string());
            state.assign.insert(name.to_string(), Role::new(*kind));
        }
        state
    }

    fn four() -> GameState {
        game(&[
            ("a", RoleKind::Citizen),
            ("b", RoleKind::Mafia),
            ("c", RoleKind::Doctor),
            ("d", RoleKind::Detective),
        ])
    }

    #[test]
    fn test_reset_returns_to_lobby() {
        let mut state = four();
        state.day_count = 3;
        state.vote.insert("a".into(), 2);
        state.meta.insert("k".into(), "v".into());
        state.reset();

        assert!(!state.active);
        assert_eq!(state.phase, Phase::Lobby);
        assert_eq!(state.day_count, 0);
        assert!(state.alive.is_empty());
        assert!(state.assign.is_empty());
        assert!(state.vote.is_empty());
        assert!(state.meta.is_empty());
    }

    #[test]
    fn test_game_continues_while_mafia_outnumbered() {
        let state = four();
        assert_eq!(state.living_by_side(), (1, 3));
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_citizens_win_when_no_mafia_alive() {
        let mut state = four();
        state.alive.remove("b");
        assert_eq!(state.winner(), Some(Team::Citizen));
    }

    #[test]
    fn test_mafia_wins_at_parity() {
        let mut state = four();
        state.alive.remove("a");
        state.alive.remove("c");
        assert_eq!(state.living_by_side(), (1, 1));
        assert_eq!(state.winner(), Some(Team::Mafia));
    }

    #[test]
    fn test_removing_a_dead_name_twice_is_harmless() {
        let mut state = four();
        state.alive.remove("a");
        let once = state.alive.clone();
        state.alive.remove("a");
        assert_eq!(state.alive, once);
    }

    #[test]
    fn test_vote_outcome_empty() {
        assert_eq!(four().vote_outcome(), VoteOutcome::NoVotes);
    }

    #[test]
    fn test_vote_outcome_unique_maximum() {
        let mut state = four();
        state.vote.insert("b".into(), 3);
        state.vote.insert("a".into(), 1);
        assert_eq!(state.vote_outcome(), VoteOutcome::Elected("b".into()));
    }

    #[test]
    fn test_vote_outcome_tie_is_not_broken() {
        let mut state = four();
        state.vote.insert("d".into(), 2);
        state.vote.insert("a".into(), 2);
        state.vote.insert("c".into(), 1);
        assert_eq!(
            state.vote_outcome(),
            VoteOutcome::Tie(vec!["a".into(), "d".into()])
        );
    }

    #[test]
    fn test_night_picks_last_pick_wins() {
        let mut picks = NightPicks::default();
        picks.set(NightSlot::Mafia, "a");
        picks.set(NightSlot::Mafia, "c");
        assert_eq!(picks.get(NightSlot::Mafia), Some("c"));
        assert_eq!(picks.get(NightSlot::Doctor), None);
    }

    #[test]
    fn test_reset_votes_clears_voters() {
        let mut state = four();
        state.vote.insert("a".into(), 1);
        state.voted.insert("b".into());
        state.reset_votes();
        assert!(state.vote.is_empty());
        assert!(state.voted.is_empty());
    }
}
