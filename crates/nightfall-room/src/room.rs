//! Room actor: an isolated Tokio task that owns one game.
//!
//! The actor drains a bounded mailbox of [`RoomCommand`]s one at a time.
//! Player input, joins and leaves, phase timers and inspection requests all
//! arrive this way, so the [`GameState`] has exactly one writer and needs
//! no lock.

use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use nightfall_protocol::{
    ClientMessage, Phase, ServerEvent, StateSnapshot, Team,
};
use nightfall_session::{ClientSession, Mailbox, PushOutcome};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::{
    DeathCause, GameState, NightPicks, NightSlot, Role, RoleKind, RoleRoom,
    RoomConfig, RoomError, RoomManager, VoteOutcome,
};

// ---------------------------------------------------------------------------
// Commands and handle
// ---------------------------------------------------------------------------

/// Commands sent to a room actor through its mailbox.
pub(crate) enum RoomCommand {
    /// A session was bound to this room.
    AddPlayer(Arc<ClientSession>),

    /// A session was unbound. Ignored unless it is still the member under
    /// that name.
    RemovePlayer(Arc<ClientSession>),

    /// Decoded input from a member.
    Message {
        session: Arc<ClientSession>,
        msg: ClientMessage,
    },

    /// The phase timer for `phase` ran out. Only the timer generation
    /// `epoch` is honoured.
    PhaseElapsed { phase: Phase, epoch: u64 },

    /// Request a [`RoomInfo`] snapshot.
    Info { reply: oneshot::Sender<RoomInfo> },
}

impl RoomCommand {
    fn label(&self) -> &'static str {
        match self {
            Self::AddPlayer(_) => "add_player",
            Self::RemovePlayer(_) => "remove_player",
            Self::Message { .. } => "message",
            Self::PhaseElapsed { .. } => "phase_elapsed",
            Self::Info { .. } => "info",
        }
    }
}

/// A snapshot of a room, taken inside the actor.
#[derive(Debug, Clone, Serialize)]
pub struct RoomInfo {
    pub name: String,
    /// Present players in join order.
    pub players: Vec<String>,
    pub host: Option<String>,
    pub active: bool,
    pub phase: Phase,
    pub day_count: u32,
    pub alive: Vec<String>,
    pub roles: BTreeMap<String, RoleKind>,
    pub votes: BTreeMap<String, u32>,
}

struct RoomShared {
    name: String,
    mailbox: Mailbox<RoomCommand>,
    closing: watch::Sender<bool>,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Two handles are the same room only if they come from
/// the same [`spawn_room`] call; a room recreated under an old name is a
/// different room.
#[derive(Clone)]
pub struct RoomHandle {
    shared: Arc<RoomShared>,
}

impl RoomHandle {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Queues a command without blocking. Returns `false` if it was not
    /// queued.
    pub(crate) fn send(&self, cmd: RoomCommand) -> bool {
        match self.shared.mailbox.push(cmd) {
            PushOutcome::Queued => true,
            PushOutcome::Evicted(old) => {
                tracing::debug!(
                    room = %self.shared.name,
                    dropped = old.label(),
                    "room mailbox full, dropped oldest command"
                );
                true
            }
            PushOutcome::Rejected(cmd) => {
                tracing::debug!(
                    room = %self.shared.name,
                    rejected = cmd.label(),
                    "room mailbox full, rejected command"
                );
                false
            }
            PushOutcome::Closed(_) => false,
        }
    }

    /// Asks the actor for a snapshot.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        if !self.send(RoomCommand::Info { reply }) {
            return Err(RoomError::Unavailable(self.shared.name.clone()));
        }
        rx.await
            .map_err(|_| RoomError::Unavailable(self.shared.name.clone()))
    }

    /// Signals the actor to stop. Pending commands are dropped and any
    /// phase timer is cancelled.
    pub fn close(&self) {
        self.shared.closing.send_replace(true);
        self.shared.mailbox.close();
    }

    pub fn is_closed(&self) -> bool {
        *self.shared.closing.borrow()
    }

    /// Returns `true` if both handles point at the same actor.
    pub fn ptr_eq(&self, other: &RoomHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("name", &self.shared.name)
            .field("pending", &self.shared.mailbox.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Phase timer
// ---------------------------------------------------------------------------

/// The room's single phase timer.
///
/// Starting a timer aborts the previous one. Each start bumps the epoch so
/// an expiry that was already queued when its timer got replaced is
/// recognisably stale.
#[derive(Default)]
struct PhaseTimer {
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

impl PhaseTimer {
    fn start(&mut self, room: &RoomHandle, phase: Phase, after: Duration) {
        self.cancel();
        let epoch = self.epoch;
        let room = room.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            room.send(RoomCommand::PhaseElapsed { phase, epoch });
        }));
    }

    fn cancel(&mut self) {
        self.epoch += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Consumes an expiry. Returns `false` for stale ones.
    fn fire(&mut self, epoch: u64) -> bool {
        if self.task.is_none() || self.epoch != epoch {
            return false;
        }
        self.task = None;
        true
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct RoomActor {
    room: RoomHandle,
    manager: Weak<RoomManager>,
    config: Arc<RoomConfig>,
    players: HashMap<String, Arc<ClientSession>>,
    /// Present players in join order. Drives host succession and the
    /// roster.
    order: Vec<String>,
    host: Option<String>,
    state: GameState,
    timer: PhaseTimer,
    rng: StdRng,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.room.name(), "room actor started");
        let mut closing = self.room.shared.closing.subscribe();

        loop {
            let next = tokio::select! {
                biased;
                _ = closing.wait_for(|closed| *closed) => None,
                cmd = self.room.shared.mailbox.recv() => cmd,
            };
            let Some(cmd) = next else { break };
            if self.apply(cmd).is_break() {
                break;
            }
        }

        self.timer.cancel();
        tracing::info!(room = %self.room.name(), "room actor stopped");
    }

    fn apply(&mut self, cmd: RoomCommand) -> ControlFlow<()> {
        match cmd {
            RoomCommand::AddPlayer(session) => self.add_player(session),
            RoomCommand::RemovePlayer(session) => {
                self.remove_player(&session);
                if self.players.is_empty() {
                    return self.retire();
                }
            }
            RoomCommand::Message { session, msg } => {
                self.handle_message(&session, msg);
            }
            RoomCommand::PhaseElapsed { phase, epoch } => {
                self.phase_elapsed(phase, epoch);
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
        }
        ControlFlow::Continue(())
    }

    /// Leaves the registry once empty. A join that raced the last leave
    /// keeps the room alive.
    fn retire(&mut self) -> ControlFlow<()> {
        let retired = match self.manager.upgrade() {
            Some(manager) => manager.remove_room(self.room.name(), &self.room),
            None => true,
        };
        if retired {
            self.room.close();
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn name(&self) -> &str {
        self.room.name()
    }

    // -- delivery -----------------------------------------------------------

    fn send_to(&self, name: &str, event: ServerEvent) {
        if let Some(session) = self.players.get(name) {
            session.push(event);
        }
    }

    fn broadcast_event(&self, event: ServerEvent) {
        for name in &self.order {
            self.send_to(name, event.clone());
        }
    }

    fn send_team(&self, team: Team, event: ServerEvent) {
        for name in &self.order {
            let on_team = self
                .state
                .assign
                .get(name)
                .is_some_and(|role| role.team() == team);
            if on_team {
                self.send_to(name, event.clone());
            }
        }
    }

    fn announce(&self, body: impl Into<String>) {
        self.broadcast_event(ServerEvent::log(self.name(), body));
    }

    fn tell(&self, name: &str, body: impl Into<String>) {
        self.send_to(name, ServerEvent::log(self.name(), body));
    }

    fn broadcast_roster(&self) {
        self.broadcast_event(ServerEvent::roster(
            self.name(),
            self.order.clone(),
        ));
    }

    // -- membership ---------------------------------------------------------

    fn is_member(&self, session: &Arc<ClientSession>) -> bool {
        self.players
            .get(session.name())
            .is_some_and(|member| Arc::ptr_eq(member, session))
    }

    fn add_player(&mut self, session: Arc<ClientSession>) {
        let name = session.name().to_string();
        self.players.insert(name.clone(), session);
        if !self.order.contains(&name) {
            self.order.push(name.clone());
        }
        let host_present = self
            .host
            .as_ref()
            .is_some_and(|host| self.players.contains_key(host));
        if !host_present {
            self.host = Some(name.clone());
        }

        tracing::info!(
            room = %self.name(),
            player = %name,
            players = self.players.len(),
            "player joined"
        );
        self.announce(format!(
            "{name} joined {}. ({} players)",
            self.name(),
            self.players.len()
        ));
        self.broadcast_roster();

        if self.state.active && !self.state.is_alive(&name) {
            self.tell(&name, "A game is in progress. You are spectating.");
        }
    }

    fn remove_player(&mut self, session: &Arc<ClientSession>) {
        if !self.is_member(session) {
            return;
        }
        let name = session.name().to_string();
        self.players.remove(&name);
        self.order.retain(|n| *n != name);

        tracing::info!(
            room = %self.name(),
            player = %name,
            players = self.players.len(),
            "player left"
        );
        if self.players.is_empty() {
            // A join may still land before the actor retires, so leave
            // nothing behind that would belong to the old table.
            self.host = None;
            self.timer.cancel();
            self.state.reset();
            return;
        }

        self.announce(format!("{name} left."));
        if self.host.as_deref() == Some(name.as_str()) {
            self.host = self.order.first().cloned();
            if let Some(host) = &self.host {
                self.announce(format!("{host} is now the host."));
            }
        }
        self.broadcast_roster();

        if self.state.active && self.state.alive.remove(&name) {
            self.announce(format!("{name} left the game."));
            self.check_game_over();
        }
    }

    // -- input --------------------------------------------------------------

    fn handle_message(
        &mut self,
        session: &Arc<ClientSession>,
        msg: ClientMessage,
    ) {
        if !self.is_member(session) {
            tracing::warn!(
                room = %self.name(),
                player = %session.name(),
                "message from non-member, ignoring"
            );
            return;
        }
        let who = session.name();

        match msg {
            ClientMessage::Chat { text } => self.handle_chat(who, &text),
            ClientMessage::Start => self.handle_start(who),
            ClientMessage::Vote { target } => {
                self.handle_vote(who, target.trim());
            }
            ClientMessage::Action { target } => {
                self.handle_action(who, target.trim());
            }
            ClientMessage::Sync => self.handle_sync(session),
            ClientMessage::Admin { action, target } => {
                self.handle_admin(who, action.trim(), target.trim());
            }
            ClientMessage::Unknown => self.tell(who, "Unknown command."),
        }
    }

    fn handle_chat(&self, author: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.state.active && self.state.phase == Phase::Night {
            let on_mafia = self
                .state
                .assign
                .get(author)
                .is_some_and(|role| role.team() == Team::Mafia);
            if on_mafia {
                let body = format!("[mafia] {text}");
                self.send_team(
                    Team::Mafia,
                    ServerEvent::chat(self.name(), author, body),
                );
            } else {
                self.tell(author, "Spectators cannot speak at night.");
            }
            return;
        }
        self.broadcast_event(ServerEvent::chat(self.name(), author, text));
    }

    fn handle_start(&mut self, who: &str) {
        if self.host.as_deref() != Some(who) {
            self.tell(who, "Only the host can start the game.");
            return;
        }
        if self.state.active {
            self.tell(who, "A game is already in progress.");
            return;
        }
        if self.players.len() < self.config.min_players {
            self.tell(
                who,
                format!(
                    "At least {} players are needed to start.",
                    self.config.min_players
                ),
            );
            return;
        }
        self.start_game();
    }

    fn handle_vote(&mut self, voter: &str, target: &str) {
        if !self.state.active || !self.state.phase.accepts_votes() {
            self.tell(voter, "It is not time to vote.");
            return;
        }
        if !self.state.is_alive(voter) {
            self.tell(voter, "Only living players can vote.");
            return;
        }
        if !self.state.is_alive(target) {
            self.tell(voter, format!("{target} is not a living player."));
            return;
        }
        if !self.state.voted.insert(voter.to_string()) {
            self.tell(voter, "You have already voted this round.");
            return;
        }

        self.add_vote(target, 1);
        self.announce(format!("{voter} voted for {target}."));
        if let Some(role) = self.state.assign.get(voter).cloned() {
            role.on_vote(self, voter, target);
        }
    }

    fn handle_action(&mut self, actor: &str, target: &str) {
        if !self.state.active || self.state.phase != Phase::Night {
            self.tell(actor, "Abilities can only be used at night.");
            return;
        }
        if !self.state.is_alive(actor) {
            self.tell(actor, "Dead players cannot act.");
            return;
        }
        if !self.state.is_alive(target) {
            self.tell(actor, format!("{target} is not a living player."));
            return;
        }
        let Some(role) = self.state.assign.get(actor).cloned() else {
            self.tell(actor, "You have no role this game.");
            return;
        };
        if !role.kind().has_night_ability() {
            self.tell(actor, "Your role has no night ability.");
            return;
        }
        if let Err(e) = role.night_action(self, actor, target) {
            tracing::debug!(
                room = %self.name(), player = %actor, error = %e,
                "night action refused"
            );
            self.tell(actor, "Your role has no night ability.");
        }
    }

    fn handle_sync(&self, session: &ClientSession) {
        session.push(ServerEvent::snapshot(
            self.name(),
            StateSnapshot {
                phase: self.state.phase,
                active: self.state.active,
                day_count: self.state.day_count,
                host: self.host.clone(),
            },
        ));
    }

    fn handle_admin(&mut self, who: &str, action: &str, target: &str) {
        if self.host.as_deref() != Some(who) {
            self.tell(who, "Only the host can use admin commands.");
            return;
        }
        match action {
            "kick" => {
                if target.is_empty() {
                    self.tell(who, "Name a player to kick.");
                    return;
                }
                if target == who {
                    self.tell(who, "You cannot kick yourself.");
                    return;
                }
                let Some(victim) = self.players.get(target).cloned() else {
                    self.tell(who, format!("No player named {target} is here."));
                    return;
                };
                victim.push(ServerEvent::log(
                    self.name(),
                    "You were kicked by the host.",
                ));
                self.announce(format!("{target} was kicked by the host."));
                tracing::info!(
                    room = %self.name(), player = %target, "player kicked"
                );
                // Detaching queues the RemovePlayer that updates the roster.
                victim.close();
            }
            "end" => {
                if !self.state.active {
                    self.tell(who, "No game is in progress.");
                    return;
                }
                self.announce("The host ended the game.");
                self.finish_game(None);
            }
            other => {
                self.tell(who, format!("Unknown admin command: {other}"));
            }
        }
    }

    // -- game flow ----------------------------------------------------------

    fn start_game(&mut self) {
        self.state.reset();
        self.state.active = true;
        self.state.alive = self.order.iter().cloned().collect();
        self.assign_roles();
        tracing::info!(
            room = %self.name(),
            players = self.state.alive.len(),
            "game started"
        );
        self.announce("The game has begun.");
        self.begin_night();
    }

    fn assign_roles(&mut self) {
        let mut players = self.order.clone();
        players.shuffle(&mut self.rng);
        let mut queue = self.config.role_queue(players.len());
        queue.shuffle(&mut self.rng);

        for (name, kind) in players.into_iter().zip(queue) {
            let role = Role::new(kind);
            self.send_to(&name, ServerEvent::role(self.name(), role.reveal()));
            self.state.assign.insert(name, role);
        }
    }

    fn enter(&mut self, next: Phase) {
        let from = self.state.phase;
        if !from.can_transition_to(next) {
            tracing::warn!(
                room = %self.name(), %from, %next,
                "unexpected phase transition"
            );
        }
        self.state.phase = next;
        tracing::debug!(room = %self.name(), %from, %next, "phase changed");
    }

    fn schedule(&mut self, phase: Phase) {
        if let Some(after) = self.config.phase_duration(phase) {
            self.timer.start(&self.room, phase, after);
        }
    }

    fn begin_night(&mut self) {
        self.enter(Phase::Night);
        self.state.picks = NightPicks::default();
        self.broadcast_event(ServerEvent::phase(
            self.name(),
            Phase::Night,
            format!(
                "Night {} falls. If you have a night ability, choose a \
                 target.",
                self.state.day_count + 1
            ),
        ));
        self.schedule(Phase::Night);
    }

    fn resolve_night(&mut self) {
        // Whoever could act tonight hears back, even if they die at dawn.
        let actors = self.living_roles();
        let mafia = self.state.picks.mafia.clone();
        let doctor = self.state.picks.doctor.clone();
        match mafia {
            Some(target) if doctor.as_deref() == Some(target.as_str()) => {
                self.announce(format!("The doctor saved {target} tonight."));
            }
            Some(target) => {
                self.eliminate(&target, DeathCause::Mafia);
            }
            None => self.announce("The mafia did not act tonight."),
        }

        for (name, role) in actors {
            role.on_night_resolved(self, &name);
        }

        if self.check_game_over() {
            return;
        }
        self.begin_day();
    }

    fn begin_day(&mut self) {
        self.enter(Phase::Day);
        self.state.reset_votes();
        self.state.day_count += 1;
        self.broadcast_event(ServerEvent::phase(
            self.name(),
            Phase::Day,
            format!(
                "Day {} begins. Discuss, then vote.",
                self.state.day_count
            ),
        ));
        for (name, role) in self.living_roles() {
            role.on_day_start(self, &name);
        }
        self.schedule(Phase::Day);
    }

    fn begin_vote(&mut self) {
        self.enter(Phase::Vote);
        self.state.reset_votes();
        self.broadcast_event(ServerEvent::phase(
            self.name(),
            Phase::Vote,
            "Voting is open. Vote for the player to execute.",
        ));
        self.schedule(Phase::Vote);
    }

    fn resolve_vote(&mut self) {
        match self.state.vote_outcome() {
            VoteOutcome::NoVotes => {
                self.announce("Nobody voted. Night falls.");
            }
            VoteOutcome::Tie(leaders) => {
                self.announce(format!(
                    "The vote is tied between {}. No one is executed.",
                    leaders.join(", ")
                ));
            }
            VoteOutcome::Elected(target) => {
                self.eliminate(&target, DeathCause::Vote);
                if self.check_game_over() {
                    return;
                }
            }
        }
        self.state.reset_votes();
        self.begin_night();
    }

    fn phase_elapsed(&mut self, phase: Phase, epoch: u64) {
        let live = self.state.active && self.state.phase == phase;
        if !live || !self.timer.fire(epoch) {
            tracing::debug!(
                room = %self.name(), %phase, epoch,
                "ignoring stale phase timer"
            );
            return;
        }
        match phase {
            Phase::Night => self.resolve_night(),
            Phase::Day => self.begin_vote(),
            Phase::Vote => self.resolve_vote(),
            Phase::Lobby | Phase::Defense => {}
        }
    }

    /// Kills `name` unless their role absorbs it. Returns `true` if the
    /// player died. Unknown and already dead names are ignored.
    fn eliminate(&mut self, name: &str, cause: DeathCause) -> bool {
        if !self.state.is_alive(name) {
            return false;
        }
        let role = self.state.assign.get(name).cloned();
        if let Some(role) = &role {
            if role.on_death(self, name, cause) {
                tracing::info!(
                    room = %self.name(), player = %name, ?cause,
                    "death absorbed"
                );
                return false;
            }
        }

        self.state.alive.remove(name);
        let role_name = role.as_ref().map_or("unknown", |r| r.name());
        self.announce(format!("{name} ({role_name}) {}.", cause.describe()));
        self.tell(name, "You are dead. You can keep watching.");
        tracing::info!(
            room = %self.name(), player = %name, ?cause,
            "player eliminated"
        );
        true
    }

    /// Ends the game if one side has won. Returns `true` if it ended.
    fn check_game_over(&mut self) -> bool {
        if !self.state.active {
            return false;
        }
        match self.state.winner() {
            Some(team) => {
                self.finish_game(Some(team));
                true
            }
            None => false,
        }
    }

    fn finish_game(&mut self, winner: Option<Team>) {
        match winner {
            Some(Team::Mafia) => self.announce("The mafia wins!"),
            Some(_) => self.announce("The citizens win!"),
            None => {}
        }
        self.timer.cancel();

        let reveal: Vec<String> = self
            .state
            .assign
            .iter()
            .map(|(name, role)| format!("{name} => {}", role.name()))
            .collect();
        if !reveal.is_empty() {
            self.announce(format!("Roles: {}", reveal.join(", ")));
        }

        self.enter(Phase::Lobby);
        self.state.reset();
        self.broadcast_event(ServerEvent::phase(
            self.name(),
            Phase::Lobby,
            "The game is over. Back to the lobby.",
        ));
        tracing::info!(room = %self.name(), ?winner, "game finished");
    }

    fn living_roles(&self) -> Vec<(String, Role)> {
        self.state
            .assign
            .iter()
            .filter(|(name, _)| self.state.is_alive(name))
            .map(|(name, role)| (name.clone(), role.clone()))
            .collect()
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            name: self.name().to_string(),
            players: self.order.clone(),
            host: self.host.clone(),
            active: self.state.active,
            phase: self.state.phase,
            day_count: self.state.day_count,
            alive: self.state.alive.iter().cloned().collect(),
            roles: self
                .state
                .assign
                .iter()
                .map(|(name, role)| (name.clone(), role.kind()))
                .collect(),
            votes: self.state.vote.clone(),
        }
    }
}

impl RoleRoom for RoomActor {
    fn room_name(&self) -> &str {
        self.room.name()
    }

    fn is_alive(&self, name: &str) -> bool {
        self.state.is_alive(name)
    }

    fn send_private(&self, to: &str, body: String) {
        self.tell(to, body);
    }

    fn broadcast(&self, body: String) {
        self.announce(body);
    }

    fn broadcast_team(&self, team: Team, body: String) {
        self.send_team(team, ServerEvent::log(self.name(), body));
    }

    fn set_night_pick(&mut self, slot: NightSlot, target: &str) {
        self.state.picks.set(slot, target);
    }

    fn night_pick(&self, slot: NightSlot) -> Option<&str> {
        self.state.picks.get(slot)
    }

    fn role_of(&self, name: &str) -> Option<&Role> {
        self.state.assign.get(name)
    }

    fn meta(&self, key: &str) -> Option<&str> {
        self.state.meta.get(key).map(String::as_str)
    }

    fn set_meta(&mut self, key: &str, value: &str) {
        self.state.meta.insert(key.to_string(), value.to_string());
    }

    fn add_vote(&mut self, target: &str, weight: u32) {
        *self.state.vote.entry(target.to_string()).or_default() += weight;
    }
}

/// Spawns a room actor and returns its handle.
pub(crate) fn spawn_room(
    name: &str,
    config: Arc<RoomConfig>,
    manager: Weak<RoomManager>,
) -> RoomHandle {
    let (closing, _) = watch::channel(false);
    let room = RoomHandle {
        shared: Arc::new(RoomShared {
            name: name.to_string(),
            mailbox: Mailbox::new(
                config.mailbox_capacity,
                config.mailbox_policy,
            ),
            closing,
        }),
    };
    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let actor = RoomActor {
        room: room.clone(),
        manager,
        config,
        players: HashMap::new(),
        order: Vec::new(),
        host: None,
        state: GameState::default(),
        timer: PhaseTimer::default(),
        rng,
    };
    tokio::spawn(actor.run());

    room
}
