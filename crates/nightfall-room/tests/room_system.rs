//! Integration tests for rooms: a manager, real room actors, and sessions
//! without sockets. Phase timers run on paused Tokio time.

use std::sync::Arc;
use std::time::Duration;

use nightfall_protocol::{
    ClientMessage, EventKind, EventState, Phase, ServerEvent,
};
use nightfall_room::{RoleKind, RoomConfig, RoomHandle, RoomInfo, RoomManager};
use nightfall_session::{ClientSession, SessionConfig};

// =========================================================================
// Harness
// =========================================================================

const NIGHT: Duration = Duration::from_secs(25);
const DAY: Duration = Duration::from_secs(40);
const VOTE: Duration = Duration::from_secs(15);

struct Table {
    manager: Arc<RoomManager>,
    room: RoomHandle,
    players: Vec<Arc<ClientSession>>,
}

impl Table {
    async fn seat(names: &[&str], config: RoomConfig) -> Self {
        let manager = RoomManager::new(config);
        let session_config = SessionConfig {
            send_buffer: 1024,
            ..SessionConfig::default()
        };
        let mut players = Vec::new();
        let mut room = None;
        for name in names {
            let session = manager.create_session(*name, &session_config);
            room = Some(manager.attach("R1", &session).unwrap());
            players.push(session);
        }
        let table = Self {
            manager,
            room: room.unwrap(),
            players,
        };
        table.info().await;
        table.clear();
        table
    }

    async fn started(names: &[&str], config: RoomConfig) -> Self {
        let table = Self::seat(names, config).await;
        table.say(names[0], ClientMessage::Start);
        let info = table.info().await;
        assert!(info.active);
        assert_eq!(info.phase, Phase::Night);
        table.clear();
        table
    }

    fn player(&self, name: &str) -> &Arc<ClientSession> {
        self.players
            .iter()
            .find(|s| s.name() == name)
            .unwrap_or_else(|| panic!("no player {name}"))
    }

    fn say(&self, name: &str, msg: ClientMessage) {
        self.manager.route_message(self.player(name), msg);
    }

    fn vote(&self, voter: &str, target: &str) {
        self.say(voter, ClientMessage::Vote { target: target.into() });
    }

    fn act(&self, actor: &str, target: &str) {
        self.say(actor, ClientMessage::Action { target: target.into() });
    }

    /// Waits for the actor to process everything queued so far.
    async fn info(&self) -> RoomInfo {
        self.room.info().await.unwrap()
    }

    fn events(&self, name: &str) -> Vec<ServerEvent> {
        self.player(name).mailbox().drain()
    }

    fn bodies(&self, name: &str) -> Vec<String> {
        self.events(name)
            .iter()
            .map(|e| e.body_str().to_string())
            .collect()
    }

    fn clear(&self) {
        for player in &self.players {
            player.mailbox().drain();
        }
    }
}

fn holders(info: &RoomInfo, kind: RoleKind) -> Vec<String> {
    info.roles
        .iter()
        .filter(|(_, k)| **k == kind)
        .map(|(name, _)| name.clone())
        .collect()
}

fn holder(info: &RoomInfo, kind: RoleKind) -> String {
    holders(info, kind)
        .pop()
        .unwrap_or_else(|| panic!("nobody holds {kind}"))
}

/// Lets every runnable task finish. Paused time only advances once the
/// runtime is idle.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

async fn elapse(d: Duration) {
    tokio::time::sleep(d + Duration::from_millis(1)).await;
}

const FOUR: [&str; 4] = ["alice", "bob", "carol", "dave"];

// =========================================================================
// Membership
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_joiner_hosts_and_roster_is_broadcast() {
    let manager = RoomManager::new(RoomConfig::default());
    let config = SessionConfig::default();
    let alice = manager.create_session("alice", &config);
    let bob = manager.create_session("bob", &config);
    let room = manager.attach("R1", &alice).unwrap();
    manager.attach("R1", &bob).unwrap();

    let info = room.info().await.unwrap();
    assert_eq!(info.host.as_deref(), Some("alice"));
    assert_eq!(info.players, vec!["alice", "bob"]);

    let events = bob.mailbox().drain();
    assert_eq!(events[0].body_str(), "bob joined R1. (2 players)");
    assert_eq!(events[1].kind, EventKind::Roster);
    assert_eq!(
        events[1].state,
        Some(EventState::Roster(vec!["alice".into(), "bob".into()]))
    );
}

#[tokio::test(start_paused = true)]
async fn test_host_passes_to_next_joiner_on_leave() {
    let table = Table::seat(&["alice", "bob", "carol"], RoomConfig::default())
        .await;

    table.manager.detach(table.player("alice"));
    let info = table.info().await;

    assert_eq!(info.host.as_deref(), Some("bob"));
    assert_eq!(info.players, vec!["bob", "carol"]);
    let bodies = table.bodies("carol");
    assert!(bodies.contains(&"alice left.".to_string()));
    assert!(bodies.contains(&"bob is now the host.".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_empty_room_is_removed_and_recreated_fresh() {
    let table = Table::seat(&["alice", "bob"], RoomConfig::default()).await;

    table.manager.detach(table.player("alice"));
    table.manager.detach(table.player("bob"));
    settle().await;

    assert_eq!(table.manager.room_count(), 0);
    assert!(table.room.is_closed());
    assert!(table.room.info().await.is_err());

    let carol = table
        .manager
        .create_session("carol", &SessionConfig::default());
    let room = table.manager.attach("R1", &carol).unwrap();
    assert!(!room.ptr_eq(&table.room));

    let info = room.info().await.unwrap();
    assert_eq!(info.players, vec!["carol"]);
    assert_eq!(info.host.as_deref(), Some("carol"));
}

#[tokio::test(start_paused = true)]
async fn test_joiner_racing_last_leave_becomes_host() {
    let manager = RoomManager::new(RoomConfig::default());
    let config = SessionConfig::default();
    let alice = manager.create_session("alice", &config);
    let bob = manager.create_session("bob", &config);

    let room = manager.attach("R1", &alice).unwrap();
    manager.detach(&alice);
    let again = manager.attach("R1", &bob).unwrap();
    assert!(again.ptr_eq(&room));

    let info = room.info().await.unwrap();
    assert_eq!(info.players, vec!["bob"]);
    assert_eq!(info.host.as_deref(), Some("bob"));

    bob.mailbox().drain();
    manager.route_message(&bob, ClientMessage::Start);
    room.info().await.unwrap();
    let bodies: Vec<String> = bob
        .mailbox()
        .drain()
        .iter()
        .map(|e| e.body_str().to_string())
        .collect();
    assert_eq!(bodies, vec!["At least 4 players are needed to start."]);
}

#[tokio::test(start_paused = true)]
async fn test_emptied_room_drops_its_game_before_a_racing_join() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    for name in FOUR {
        table.manager.detach(table.player(name));
    }
    let erin = table
        .manager
        .create_session("erin", &SessionConfig::default());
    table.manager.attach("R1", &erin).unwrap();

    let info = table.info().await;
    assert_eq!(info.players, vec!["erin"]);
    assert_eq!(info.host.as_deref(), Some("erin"));
    assert!(!info.active);
    assert_eq!(info.phase, Phase::Lobby);

    elapse(NIGHT).await;
    let info = table.info().await;
    assert!(!info.active);
    assert_eq!(info.day_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_closed_session_leaves_its_room() {
    let table = Table::seat(&["alice", "bob"], RoomConfig::default()).await;

    table.player("bob").close();
    let info = table.info().await;

    assert_eq!(info.players, vec!["alice"]);
    assert!(table.manager.player_room("bob").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_late_joiner_spectates_running_game() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;

    let erin = table
        .manager
        .create_session("erin", &SessionConfig::default());
    table.manager.attach("R1", &erin).unwrap();
    let info = table.info().await;

    assert_eq!(info.players.len(), 5);
    assert!(!info.alive.contains(&"erin".to_string()));
    let bodies: Vec<String> = erin
        .mailbox()
        .drain()
        .iter()
        .map(|e| e.body_str().to_string())
        .collect();
    assert!(bodies.contains(
        &"A game is in progress. You are spectating.".to_string()
    ));
}

// =========================================================================
// Starting
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_start_requires_minimum_players() {
    let table =
        Table::seat(&["alice", "bob", "carol"], RoomConfig::default()).await;

    table.say("alice", ClientMessage::Start);
    let info = table.info().await;

    assert!(!info.active);
    assert_eq!(info.phase, Phase::Lobby);
    assert_eq!(
        table.bodies("alice"),
        vec!["At least 4 players are needed to start."]
    );
    assert!(table.bodies("bob").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_only_host_can_start() {
    let table = Table::seat(&FOUR, RoomConfig::default()).await;

    table.say("bob", ClientMessage::Start);
    let info = table.info().await;

    assert!(!info.active);
    assert_eq!(table.bodies("bob"), vec!["Only the host can start the game."]);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_is_refused() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;

    table.say("alice", ClientMessage::Start);
    let info = table.info().await;

    assert_eq!(info.day_count, 0);
    assert_eq!(table.bodies("alice"), vec!["A game is already in progress."]);
}

#[tokio::test(start_paused = true)]
async fn test_start_deals_roles_and_enters_night() {
    let table = Table::seat(&FOUR, RoomConfig::default()).await;

    table.say("alice", ClientMessage::Start);
    let info = table.info().await;

    assert!(info.active);
    assert_eq!(info.phase, Phase::Night);
    assert_eq!(info.day_count, 0);
    assert_eq!(info.alive.len(), 4);
    assert_eq!(holders(&info, RoleKind::Mafia).len(), 1);
    assert_eq!(holders(&info, RoleKind::Doctor).len(), 1);
    assert_eq!(holders(&info, RoleKind::Detective).len(), 1);
    assert_eq!(holders(&info, RoleKind::Citizen).len(), 1);

    for name in FOUR {
        let events = table.events(name);
        let reveal = events
            .iter()
            .find(|e| e.kind == EventKind::Role)
            .expect("role event");
        let Some(EventState::Role(role)) = &reveal.state else {
            panic!("role event without reveal");
        };
        assert_eq!(role.role, info.roles[name].name());
        assert!(events.iter().any(|e| {
            e.kind == EventKind::Phase && e.phase == Some(Phase::Night)
        }));
    }
}

#[tokio::test(start_paused = true)]
async fn test_large_table_deals_two_mafia() {
    let names = ["a", "b", "c", "d", "e", "f", "g"];
    let table = Table::started(&names, RoomConfig::default()).await;

    let info = table.info().await;

    assert_eq!(holders(&info, RoleKind::Mafia).len(), 2);
    assert_eq!(holders(&info, RoleKind::Citizen).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_rooms_deal_identically() {
    let config = RoomConfig {
        rng_seed: Some(7),
        ..RoomConfig::default()
    };
    let first = Table::started(&FOUR, config.clone()).await;
    let second = Table::started(&FOUR, config).await;

    assert_eq!(first.info().await.roles, second.info().await.roles);
}

// =========================================================================
// Night
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_quiet_night_leads_to_day_one() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;

    elapse(NIGHT).await;
    let info = table.info().await;

    assert_eq!(info.phase, Phase::Day);
    assert_eq!(info.day_count, 1);
    assert_eq!(info.alive.len(), 4);
    let bodies = table.bodies("bob");
    assert!(bodies.contains(&"The mafia did not act tonight.".to_string()));
    assert!(
        bodies.contains(&"Day 1 begins. Discuss, then vote.".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_mafia_kill_resolves_at_dawn() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let citizen = holder(&info, RoleKind::Citizen);

    table.act(&mafia, &citizen);
    elapse(NIGHT).await;
    let info = table.info().await;

    assert_eq!(info.phase, Phase::Day);
    assert!(!info.alive.contains(&citizen));
    assert_eq!(info.alive.len(), 3);
    assert!(table.bodies(&citizen).contains(
        &"You are dead. You can keep watching.".to_string()
    ));
    let announced = format!("{citizen} (citizen) was killed by the mafia.");
    assert!(table.bodies(&mafia).contains(&announced));
}

#[tokio::test(start_paused = true)]
async fn test_doctor_save_cancels_kill() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let doctor = holder(&info, RoleKind::Doctor);
    let citizen = holder(&info, RoleKind::Citizen);

    table.act(&mafia, &citizen);
    table.act(&doctor, &citizen);
    elapse(NIGHT).await;
    let info = table.info().await;

    assert_eq!(info.alive.len(), 4);
    assert!(
        table
            .bodies(&citizen)
            .contains(&format!("The doctor saved {citizen} tonight."))
    );
}

#[tokio::test(start_paused = true)]
async fn test_detective_learns_verdict_at_dawn() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let detective = holder(&info, RoleKind::Detective);

    table.act(&detective, &mafia);
    table.info().await;
    assert_eq!(
        table.bodies(&detective),
        vec![format!("You are investigating {mafia}.")]
    );

    elapse(NIGHT).await;
    table.info().await;

    assert!(
        table
            .bodies(&detective)
            .contains(&format!("{mafia} is mafia."))
    );
}

#[tokio::test(start_paused = true)]
async fn test_detective_killed_at_dawn_still_learns_verdict() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let detective = holder(&info, RoleKind::Detective);

    table.act(&detective, &mafia);
    table.act(&mafia, &detective);
    elapse(NIGHT).await;
    let info = table.info().await;

    assert!(!info.alive.contains(&detective));
    let bodies = table.bodies(&detective);
    assert!(bodies.contains(&format!("{mafia} is mafia.")));
    assert!(
        bodies.contains(&"You are dead. You can keep watching.".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_passive_role_has_no_night_ability() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let citizen = holder(&info, RoleKind::Citizen);
    let mafia = holder(&info, RoleKind::Mafia);

    table.act(&citizen, &mafia);
    table.info().await;

    assert_eq!(
        table.bodies(&citizen),
        vec!["Your role has no night ability."]
    );
}

#[tokio::test(start_paused = true)]
async fn test_night_chat_reaches_only_mafia() {
    let names = ["a", "b", "c", "d", "e", "f", "g"];
    let table = Table::started(&names, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holders(&info, RoleKind::Mafia);
    let citizen = holder(&info, RoleKind::Citizen);

    table.say(&mafia[0], ClientMessage::Chat { text: "hi".into() });
    table.say(&citizen, ClientMessage::Chat { text: "hello?".into() });
    table.info().await;

    for name in names {
        let chats: Vec<ServerEvent> = table
            .events(name)
            .into_iter()
            .filter(|e| e.kind == EventKind::Chat)
            .collect();
        if mafia.iter().any(|m| m == name) {
            assert_eq!(chats.len(), 1);
            assert_eq!(chats[0].body_str(), "[mafia] hi");
            assert_eq!(chats[0].author.as_deref(), Some(mafia[0].as_str()));
        } else {
            assert!(chats.is_empty(), "{name} overheard the mafia");
        }
    }
    table.say(&citizen, ClientMessage::Chat { text: "again".into() });
    table.info().await;
    assert_eq!(
        table.bodies(&citizen),
        vec!["Spectators cannot speak at night."]
    );
}

#[tokio::test(start_paused = true)]
async fn test_lobby_chat_reaches_everyone() {
    let table = Table::seat(&["alice", "bob"], RoomConfig::default()).await;

    table.say("alice", ClientMessage::Chat { text: " hey ".into() });
    table.info().await;

    let events = table.events("bob");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Chat);
    assert_eq!(events[0].body_str(), "hey");
    assert_eq!(events[0].author.as_deref(), Some("alice"));
}

// =========================================================================
// Voting
// =========================================================================

/// Runs a started table from Night 1 into the first Vote phase.
async fn into_vote(table: &Table) {
    elapse(NIGHT).await;
    elapse(DAY).await;
    let info = table.info().await;
    assert_eq!(info.phase, Phase::Vote);
    table.clear();
}

#[tokio::test(start_paused = true)]
async fn test_vote_outside_voting_phase_is_refused() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;

    table.vote("alice", "bob");
    let info = table.info().await;

    assert!(info.votes.is_empty());
    assert_eq!(table.bodies("alice"), vec!["It is not time to vote."]);
}

#[tokio::test(start_paused = true)]
async fn test_each_player_votes_once_per_round() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    into_vote(&table).await;

    table.vote("alice", "bob");
    table.vote("alice", "carol");
    table.vote("bob", "nobody");
    let info = table.info().await;

    assert_eq!(info.votes.get("bob"), Some(&1));
    assert_eq!(info.votes.get("carol"), None);
    let alice = table.bodies("alice");
    assert!(alice.contains(&"alice voted for bob.".to_string()));
    assert!(
        alice.contains(&"You have already voted this round.".to_string())
    );
    assert!(
        table
            .bodies("bob")
            .contains(&"nobody is not a living player.".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_nobody_voted_goes_to_night() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    into_vote(&table).await;

    elapse(VOTE).await;
    let info = table.info().await;

    assert_eq!(info.phase, Phase::Night);
    assert_eq!(info.alive.len(), 4);
    assert!(
        table
            .bodies("alice")
            .contains(&"Nobody voted. Night falls.".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_tied_vote_executes_nobody() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    into_vote(&table).await;

    table.vote("alice", "bob");
    table.vote("bob", "alice");
    elapse(VOTE).await;
    let info = table.info().await;

    assert_eq!(info.phase, Phase::Night);
    assert_eq!(info.alive.len(), 4);
    assert!(table.bodies("carol").contains(
        &"The vote is tied between alice, bob. No one is executed."
            .to_string()
    ));
}

#[tokio::test(start_paused = true)]
async fn test_two_player_game_ends_at_first_dawn() {
    let config = RoomConfig {
        min_players: 2,
        ..RoomConfig::default()
    };
    let table = Table::started(&["alice", "bob"], config).await;

    elapse(NIGHT).await;
    let info = table.info().await;

    assert!(!info.active);
    assert_eq!(info.phase, Phase::Lobby);
    assert!(table.bodies("bob").contains(&"The mafia wins!".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_executing_the_mafia_wins_for_citizens() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let scapegoat = holder(&info, RoleKind::Citizen);
    into_vote(&table).await;

    for name in FOUR {
        let target = if name == mafia { &scapegoat } else { &mafia };
        table.vote(name, target);
    }
    elapse(VOTE).await;
    let info = table.info().await;

    assert!(!info.active);
    assert_eq!(info.phase, Phase::Lobby);
    assert!(info.roles.is_empty());
    assert!(info.alive.is_empty());
    assert_eq!(info.day_count, 0);

    let bodies = table.bodies("alice");
    assert!(bodies.contains(&format!("{mafia} (mafia) was executed by vote.")));
    assert!(bodies.contains(&"The citizens win!".to_string()));
    assert!(bodies.iter().any(|b| b.starts_with("Roles: ")));
    assert_eq!(
        bodies.last().map(String::as_str),
        Some("The game is over. Back to the lobby.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_mafia_wins_at_parity() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let citizen = holder(&info, RoleKind::Citizen);
    let detective = holder(&info, RoleKind::Detective);

    table.act(&mafia, &citizen);
    into_vote(&table).await;
    for name in FOUR {
        if name != citizen && name != detective {
            table.vote(name, &detective);
        }
    }
    elapse(VOTE).await;
    let info = table.info().await;

    assert!(!info.active);
    assert!(table.bodies("alice").contains(&"The mafia wins!".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_mafia_leaving_ends_the_game() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let citizen = holder(&info, RoleKind::Citizen);

    table.manager.detach(table.player(&mafia));
    let info = table.info().await;

    assert!(!info.active);
    assert_eq!(info.phase, Phase::Lobby);
    assert!(table.bodies(&citizen).contains(&"The citizens win!".to_string()));
}

// =========================================================================
// Role hooks
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_soldier_survives_first_attack() {
    let config = RoomConfig {
        special_roles: vec![RoleKind::Soldier],
        ..RoomConfig::default()
    };
    let table = Table::started(&FOUR, config).await;
    let info = table.info().await;
    let mafia = holder(&info, RoleKind::Mafia);
    let soldier = holder(&info, RoleKind::Soldier);

    table.act(&mafia, &soldier);
    elapse(NIGHT).await;
    let info = table.info().await;

    assert!(info.alive.contains(&soldier));
    assert!(
        table
            .bodies(&mafia)
            .contains(&format!("{soldier} survived an attack!"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_politician_vote_counts_double() {
    let config = RoomConfig {
        special_roles: vec![RoleKind::Politician],
        ..RoomConfig::default()
    };
    let table = Table::started(&FOUR, config).await;
    let info = table.info().await;
    let politician = holder(&info, RoleKind::Politician);
    let mafia = holder(&info, RoleKind::Mafia);
    into_vote(&table).await;

    table.vote(&politician, &mafia);
    let info = table.info().await;

    assert_eq!(info.votes.get(&mafia), Some(&2));
}

#[tokio::test(start_paused = true)]
async fn test_politician_survives_execution() {
    let config = RoomConfig {
        special_roles: vec![RoleKind::Politician],
        ..RoomConfig::default()
    };
    let table = Table::started(&FOUR, config).await;
    let info = table.info().await;
    let politician = holder(&info, RoleKind::Politician);
    into_vote(&table).await;

    for name in FOUR {
        if name != politician {
            table.vote(name, &politician);
        }
    }
    elapse(VOTE).await;
    let info = table.info().await;

    assert!(info.active);
    assert!(info.alive.contains(&politician));
    assert_eq!(info.phase, Phase::Night);
}

// =========================================================================
// Timers, admin and misc commands
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_ended_game_ignores_pending_phase_timer() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;

    table.say(
        "alice",
        ClientMessage::Admin {
            action: "end".into(),
            target: String::new(),
        },
    );
    table.info().await;
    table.clear();

    elapse(NIGHT + DAY).await;
    let info = table.info().await;

    assert!(!info.active);
    assert_eq!(info.phase, Phase::Lobby);
    assert_eq!(info.day_count, 0);
    assert!(table.events("bob").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restarted_game_is_not_advanced_by_old_timer() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;
    let end = ClientMessage::Admin {
        action: "end".into(),
        target: String::new(),
    };

    tokio::time::sleep(Duration::from_secs(20)).await;
    table.say("alice", end);
    table.say("alice", ClientMessage::Start);
    table.info().await;

    // The old night would have ended at 25s, the new one ends at 45s.
    tokio::time::sleep(Duration::from_secs(10)).await;
    let info = table.info().await;
    assert_eq!(info.phase, Phase::Night);
    assert_eq!(info.day_count, 0);

    elapse(Duration::from_secs(15)).await;
    assert_eq!(table.info().await.phase, Phase::Day);
}

#[tokio::test(start_paused = true)]
async fn test_host_kicks_player() {
    let table = Table::seat(&["alice", "bob", "carol"], RoomConfig::default())
        .await;

    table.say(
        "alice",
        ClientMessage::Admin {
            action: "kick".into(),
            target: "bob".into(),
        },
    );
    settle().await;
    let info = table.info().await;

    assert_eq!(info.players, vec!["alice", "carol"]);
    assert!(table.player("bob").is_closed());
    assert!(table.manager.player_room("bob").is_none());
    assert!(
        table
            .bodies("bob")
            .contains(&"You were kicked by the host.".to_string())
    );
    assert!(
        table
            .bodies("carol")
            .contains(&"bob was kicked by the host.".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_admin_commands_are_host_only() {
    let table = Table::seat(&["alice", "bob"], RoomConfig::default()).await;

    table.say(
        "bob",
        ClientMessage::Admin {
            action: "kick".into(),
            target: "alice".into(),
        },
    );
    table.say(
        "alice",
        ClientMessage::Admin {
            action: "ban".into(),
            target: "bob".into(),
        },
    );
    let info = table.info().await;

    assert_eq!(info.players, vec!["alice", "bob"]);
    assert_eq!(
        table.bodies("bob"),
        vec!["Only the host can use admin commands."]
    );
    assert_eq!(table.bodies("alice"), vec!["Unknown admin command: ban"]);
}

#[tokio::test(start_paused = true)]
async fn test_sync_returns_private_snapshot() {
    let table = Table::started(&FOUR, RoomConfig::default()).await;

    table.say("bob", ClientMessage::Sync);
    table.info().await;

    let events = table.events("bob");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::State);
    let Some(EventState::Snapshot(snapshot)) = &events[0].state else {
        panic!("expected a snapshot");
    };
    assert_eq!(snapshot.phase, Phase::Night);
    assert!(snapshot.active);
    assert_eq!(snapshot.host.as_deref(), Some("alice"));
    assert!(table.events("alice").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_command_is_answered_privately() {
    let table = Table::seat(&["alice", "bob"], RoomConfig::default()).await;

    table.say("bob", ClientMessage::Unknown);
    table.info().await;

    assert_eq!(table.bodies("bob"), vec!["Unknown command."]);
    assert!(table.events("alice").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_manager_room_info_reports_missing_room() {
    let manager = RoomManager::new(RoomConfig::default());
    assert!(manager.room_info("nowhere").await.is_err());
}
