//! Room manager: creates rooms on demand and routes players to them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use nightfall_protocol::ClientMessage;
use nightfall_session::{ClientSession, Router, SessionConfig};

use crate::room::{RoomCommand, spawn_room};
use crate::{RoomConfig, RoomError, RoomHandle, RoomInfo};

/// A player's current room, plus the exact session that joined it.
struct Binding {
    room: RoomHandle,
    session: Arc<ClientSession>,
}

#[derive(Default)]
struct Registry {
    rooms: HashMap<String, RoomHandle>,
    /// A player can be in at most one room at a time.
    players: HashMap<String, Binding>,
    closed: bool,
}

/// Process-wide registry of rooms and player bindings.
///
/// The registry lock is only held for map updates. Commands are pushed to
/// room mailboxes after it is released, and pushing never blocks.
pub struct RoomManager {
    config: Arc<RoomConfig>,
    registry: Mutex<Registry>,
    this: Weak<RoomManager>,
}

impl RoomManager {
    pub fn new(config: RoomConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            config: Arc::new(config),
            registry: Mutex::new(Registry::default()),
            this: this.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The router handed to sessions so their input reaches this manager.
    pub fn router(&self) -> Weak<dyn Router> {
        let router: Weak<dyn Router> = self.this.clone();
        router
    }

    /// Creates a session whose input is routed through this manager.
    pub fn create_session(
        &self,
        name: impl Into<String>,
        config: &SessionConfig,
    ) -> Arc<ClientSession> {
        ClientSession::new(name, config, self.router())
    }

    /// Binds `session` to `room_name`, creating the room if needed.
    ///
    /// # Errors
    /// `AlreadyJoined` if the player's name is bound to any room; the
    /// caller should close the offending connection. `Closed` after
    /// [`close`](Self::close).
    pub fn attach(
        &self,
        room_name: &str,
        session: &Arc<ClientSession>,
    ) -> Result<RoomHandle, RoomError> {
        let player = session.name();
        let room = {
            let mut registry = self.lock();
            if registry.closed {
                return Err(RoomError::Closed);
            }
            if let Some(binding) = registry.players.get(player) {
                return Err(RoomError::AlreadyJoined {
                    player: player.to_string(),
                    room: binding.room.name().to_string(),
                });
            }

            let existing = registry
                .rooms
                .get(room_name)
                .filter(|room| !room.is_closed())
                .cloned();
            let room = match existing {
                Some(room) => room,
                None => {
                    let room = spawn_room(
                        room_name,
                        Arc::clone(&self.config),
                        self.this.clone(),
                    );
                    registry.rooms.insert(room_name.to_string(), room.clone());
                    tracing::info!(room = %room_name, "room created");
                    room
                }
            };
            registry.players.insert(
                player.to_string(),
                Binding {
                    room: room.clone(),
                    session: Arc::clone(session),
                },
            );
            room
        };

        session.set_room(Some(room_name.to_string()));
        room.send(RoomCommand::AddPlayer(Arc::clone(session)));
        Ok(room)
    }

    /// Unbinds `session` from its room. Does nothing unless this exact
    /// session holds the binding.
    pub fn detach(&self, session: &ClientSession) {
        let binding = {
            let mut registry = self.lock();
            let owns_binding = registry
                .players
                .get(session.name())
                .is_some_and(|b| {
                    std::ptr::eq(Arc::as_ptr(&b.session), session)
                });
            if !owns_binding {
                return;
            }
            registry.players.remove(session.name())
        };

        if let Some(Binding { room, session }) = binding {
            session.set_room(None);
            tracing::debug!(
                room = %room.name(),
                player = %session.name(),
                "player detached"
            );
            room.send(RoomCommand::RemovePlayer(session));
        }
    }

    /// Forwards a message to the sender's room.
    pub fn route_message(
        &self,
        session: &Arc<ClientSession>,
        msg: ClientMessage,
    ) {
        let room = self
            .lock()
            .players
            .get(session.name())
            .filter(|b| Arc::ptr_eq(&b.session, session))
            .map(|b| b.room.clone());

        match room {
            Some(room) => {
                room.send(RoomCommand::Message {
                    session: Arc::clone(session),
                    msg,
                });
            }
            None => session.push_system("You are not currently in a room."),
        }
    }

    /// Stops every room and disconnects every bound session.
    ///
    /// Used at process shutdown. Later `attach` calls fail with `Closed`.
    pub fn close(&self) {
        let (rooms, sessions) = {
            let mut registry = self.lock();
            registry.closed = true;
            let rooms: Vec<RoomHandle> =
                registry.rooms.drain().map(|(_, room)| room).collect();
            let sessions: Vec<Arc<ClientSession>> = registry
                .players
                .drain()
                .map(|(_, binding)| binding.session)
                .collect();
            (rooms, sessions)
        };

        for room in &rooms {
            room.close();
        }
        for session in &sessions {
            session.close();
        }
        tracing::info!(
            rooms = rooms.len(),
            sessions = sessions.len(),
            "room manager closed"
        );
    }

    /// Removes `room` from the registry if it is still the room registered
    /// under `name` and no player is bound to it.
    ///
    /// Returns `false` only when a player is still bound, meaning a join
    /// raced the last leave and the room must keep running.
    pub(crate) fn remove_room(&self, name: &str, room: &RoomHandle) -> bool {
        let mut registry = self.lock();
        if registry.players.values().any(|b| b.room.ptr_eq(room)) {
            return false;
        }
        let current = registry.rooms.get(name).is_some_and(|r| r.ptr_eq(room));
        if current {
            registry.rooms.remove(name);
            tracing::info!(room = %name, "room removed");
        }
        true
    }

    // -- inspection ---------------------------------------------------------

    pub fn room(&self, name: &str) -> Option<RoomHandle> {
        self.lock().rooms.get(name).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    /// The room `player` is bound to.
    pub fn player_room(&self, player: &str) -> Option<String> {
        self.lock()
            .players
            .get(player)
            .map(|b| b.room.name().to_string())
    }

    /// Asks a room for a snapshot.
    pub async fn room_info(&self, name: &str) -> Result<RoomInfo, RoomError> {
        let room = self
            .room(name)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))?;
        room.info().await
    }
}

impl Router for RoomManager {
    fn route(&self, session: &Arc<ClientSession>, msg: ClientMessage) {
        self.route_message(session, msg);
    }

    fn detach(&self, session: &ClientSession) {
        RoomManager::detach(self, session);
    }
}
