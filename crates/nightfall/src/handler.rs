//! Per-connection handler: join the requested room, then run the session.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The room and player name come from the upgrade URL, so there is no
//! in-band handshake.

use std::sync::Arc;

use nightfall_protocol::{Codec, ServerEvent};
use nightfall_room::RoomError;
use nightfall_transport::{Connection, WebSocketConnection};

use crate::NightfallError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), NightfallError> {
    let conn_id = conn.id();
    let session = state
        .manager
        .create_session(conn.user(), &state.session_config);

    if let Err(e) = state.manager.attach(conn.room(), &session) {
        tracing::info!(
            %conn_id, player = %session.name(), error = %e,
            "join refused"
        );
        refuse(&conn, &state, &e).await;
        return Err(e.into());
    }
    tracing::info!(
        %conn_id, player = %session.name(), room = %conn.room(),
        "player connected"
    );

    nightfall_session::run(
        session,
        conn,
        state.codec,
        state.session_config.clone(),
    )
    .await?;
    Ok(())
}

/// Tells the client why it was turned away, then closes the socket.
async fn refuse(
    conn: &WebSocketConnection,
    state: &ServerState,
    err: &RoomError,
) {
    let body = match err {
        RoomError::AlreadyJoined { room, .. } => {
            format!("You are already in room {room}.")
        }
        RoomError::Closed => "The server is shutting down.".to_string(),
        other => other.to_string(),
    };
    let notice = ServerEvent::log(conn.room(), body);
    match state.codec.encode_text(&notice) {
        Ok(text) => {
            if let Err(e) = conn.send_text(&text).await {
                tracing::debug!(error = %e, "could not deliver refusal");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not encode refusal"),
    }
    let _ = conn.close().await;
}
