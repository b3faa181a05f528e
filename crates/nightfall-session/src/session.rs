//! The per-player session record and its routing seam.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use nightfall_protocol::{ClientMessage, ServerEvent};
use tokio::sync::watch;

use crate::mailbox::{Mailbox, OverflowPolicy, PushOutcome};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timeouts and limits for a session's connection workers.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Deadline for a single outbound write (including pings).
    pub write_wait: Duration,

    /// How long the reader waits for any frame before giving up on the
    /// peer. Every frame, pongs included, restarts the wait.
    pub pong_wait: Duration,

    /// How often the writer pings. Must be shorter than `pong_wait`.
    pub ping_interval: Duration,

    /// Outbound mailbox capacity. When full, the oldest event is dropped.
    pub send_buffer: usize,

    /// Largest inbound frame accepted, in bytes.
    pub max_frame_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            write_wait: Duration::from_secs(10),
            pong_wait: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
            send_buffer: 64,
            max_frame_bytes: 1 << 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Where a session sends what it reads, and whom it tells when it leaves.
///
/// Implemented by the room manager. Both calls must return promptly: they
/// run on the session's read worker and must not wait on a room.
pub trait Router: Send + Sync + 'static {
    /// Hands a decoded message to the session's current room.
    fn route(&self, session: &Arc<ClientSession>, msg: ClientMessage);

    /// Unbinds the session from its room, if this exact session is bound.
    fn detach(&self, session: &ClientSession);
}

/// Stand-in for sessions created without a router.
struct Unrouted;

impl Router for Unrouted {
    fn route(&self, _: &Arc<ClientSession>, _: ClientMessage) {}
    fn detach(&self, _: &ClientSession) {}
}

// ---------------------------------------------------------------------------
// ClientSession
// ---------------------------------------------------------------------------

/// One connected player.
///
/// The display name is the player's identity; there is no separate ID.
/// Rooms talk to the player only through [`push`](Self::push), which never
/// blocks.
pub struct ClientSession {
    name: String,
    outbound: Mailbox<ServerEvent>,
    room: Mutex<Option<String>>,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
    router: Weak<dyn Router>,
}

impl ClientSession {
    /// Creates a session whose input is routed through `router`.
    pub fn new(
        name: impl Into<String>,
        config: &SessionConfig,
        router: Weak<dyn Router>,
    ) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            name: name.into(),
            outbound: Mailbox::new(
                config.send_buffer,
                OverflowPolicy::DropOldest,
            ),
            room: Mutex::new(None),
            closed: AtomicBool::new(false),
            shutdown,
            router,
        })
    }

    /// Creates a session that is not connected to any router.
    ///
    /// Useful for driving a room directly; `close` only shuts the mailbox.
    pub fn standalone(name: impl Into<String>, send_buffer: usize) -> Arc<Self> {
        let router: Weak<dyn Router> = Weak::<Unrouted>::new();
        let config = SessionConfig {
            send_buffer,
            ..SessionConfig::default()
        };
        Self::new(name, &config, router)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the room this session is bound to, if any.
    pub fn room(&self) -> Option<String> {
        self.room
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records the room binding. Set by the router on attach and detach.
    pub fn set_room(&self, room: Option<String>) {
        *self.room.lock().unwrap_or_else(PoisonError::into_inner) = room;
    }

    /// Queues an event for delivery. Never blocks.
    ///
    /// A full mailbox drops its oldest event; a closed one drops this one.
    pub fn push(&self, event: ServerEvent) {
        match self.outbound.push(event) {
            PushOutcome::Queued => {}
            PushOutcome::Evicted(old) => {
                tracing::debug!(
                    player = %self.name,
                    dropped = ?old.kind,
                    "outbound mailbox full, dropped oldest event"
                );
            }
            PushOutcome::Rejected(_) | PushOutcome::Closed(_) => {
                tracing::trace!(player = %self.name, "event not queued");
            }
        }
    }

    /// Queues a private system line tagged with the current room.
    pub fn push_system(&self, body: impl Into<String>) {
        let room = self.room().unwrap_or_default();
        self.push(ServerEvent::log(&room, body));
    }

    /// The outbound queue drained by the write worker.
    pub fn mailbox(&self) -> &Mailbox<ServerEvent> {
        &self.outbound
    }

    /// Tears the session down.
    ///
    /// Only the first call does anything: it detaches from the router,
    /// closes the mailbox (the writer flushes what is queued, then sends a
    /// close frame) and stops the reader.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(router) = self.router.upgrade() {
            router.detach(self);
        }
        self.outbound.close();
        self.shutdown.send_replace(true);
        tracing::debug!(player = %self.name, "session closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn router(&self) -> Option<Arc<dyn Router>> {
        self.router.upgrade()
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("name", &self.name)
            .field("room", &self.room())
            .field("closed", &self.is_closed())
            .finish()
    }
}
