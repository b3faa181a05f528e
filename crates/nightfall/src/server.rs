//! `NightfallServer` builder and accept loop.
//!
//! This is the entry point for running a Nightfall server. It ties the
//! layers together: transport → session → room.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nightfall_protocol::JsonCodec;
use nightfall_room::{RoomConfig, RoomManager};
use nightfall_session::SessionConfig;
use nightfall_transport::{
    DEFAULT_HANDSHAKE_TIMEOUT, Transport, TransportError, WebSocketTransport,
};

use crate::NightfallError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) manager: Arc<RoomManager>,
    pub(crate) session_config: SessionConfig,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Nightfall server.
///
/// # Example
///
/// ```rust,ignore
/// use nightfall::prelude::*;
///
/// let server = NightfallServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct NightfallServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    session_config: SessionConfig,
    handshake_timeout: Duration,
}

impl NightfallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            session_config: SessionConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration shared by every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the per-connection session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets how long a new socket may take to send its upgrade request.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener.
    pub async fn build(self) -> Result<NightfallServer, NightfallError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);

        let state = Arc::new(ServerState {
            manager: RoomManager::new(self.room_config),
            session_config: self.session_config,
            codec: JsonCodec,
        });

        Ok(NightfallServer { transport, state })
    }
}

impl Default for NightfallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Nightfall server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct NightfallServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl NightfallServer {
    /// Creates a new builder.
    pub fn builder() -> NightfallServerBuilder {
        NightfallServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The room registry behind this server.
    pub fn manager(&self) -> Arc<RoomManager> {
        Arc::clone(&self.state.manager)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), NightfallError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves, then closes every
    /// room and every connected session.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), NightfallError> {
        tracing::info!("Nightfall server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await
                            {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(TransportError::MissingParameter(param)) => {
                        tracing::debug!(param, "upgrade refused");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!("Nightfall server shutting down");
        self.state.manager.close();
        self.transport.shutdown().await?;
        Ok(())
    }
}
