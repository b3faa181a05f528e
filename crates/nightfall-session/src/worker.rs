//! Read and write workers for a live connection.

use std::sync::Arc;

use nightfall_protocol::{ClientMessage, Codec};
use nightfall_transport::{Connection, Frame};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{ClientSession, SessionConfig, SessionError};

/// Drives `conn` on behalf of `session` until either side ends it.
///
/// The write worker is spawned; the read worker runs on the caller's task.
/// Whichever stops first closes the session, which stops the other. The
/// returned error, if any, is why the reader stopped.
pub async fn run<C, K>(
    session: Arc<ClientSession>,
    conn: C,
    codec: K,
    config: SessionConfig,
) -> Result<(), SessionError>
where
    C: Connection,
    K: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();

    let writer = tokio::spawn(write_worker(
        Arc::clone(&session),
        Arc::clone(&conn),
        codec.clone(),
        config.clone(),
    ));

    let result = read_worker(&session, conn.as_ref(), &codec, &config).await;
    match &result {
        Ok(()) => {
            tracing::debug!(
                %conn_id, player = %session.name(), "reader finished"
            );
        }
        Err(e) => tracing::info!(
            %conn_id, player = %session.name(), error = %e, "reader stopped"
        ),
    }
    session.close();

    if let Err(e) = writer.await {
        tracing::warn!(%conn_id, error = %e, "write worker panicked");
    }
    result
}

async fn read_worker<C, K>(
    session: &Arc<ClientSession>,
    conn: &C,
    codec: &K,
    config: &SessionConfig,
) -> Result<(), SessionError>
where
    C: Connection,
    K: Codec,
{
    let mut shutdown = session.shutdown_signal();

    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.wait_for(|closed| *closed) => return Ok(()),
            read = time::timeout(config.pong_wait, conn.recv()) => read,
        };

        let data = match frame {
            Ok(Ok(Some(Frame::Data(data)))) => data,
            Ok(Ok(Some(Frame::Pong))) => continue,
            Ok(Ok(None)) => {
                tracing::debug!(
                    player = %session.name(),
                    "connection closed by peer"
                );
                return Ok(());
            }
            Ok(Err(e)) => return Err(SessionError::transport(e)),
            Err(_) => return Err(SessionError::ReadTimeout(config.pong_wait)),
        };

        if data.len() > config.max_frame_bytes {
            return Err(SessionError::FrameTooLarge {
                size: data.len(),
                limit: config.max_frame_bytes,
            });
        }

        let msg: ClientMessage = match codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    player = %session.name(), error = %e, "bad frame"
                );
                session.push_system("Bad message format.");
                continue;
            }
        };

        let Some(router) = session.router() else {
            return Err(SessionError::RouterGone);
        };
        router.route(session, msg);
    }
}

async fn write_worker<C, K>(
    session: Arc<ClientSession>,
    conn: Arc<C>,
    codec: K,
    config: SessionConfig,
) where
    C: Connection,
    K: Codec,
{
    let mut ticker = time::interval_at(
        Instant::now() + config.ping_interval,
        config.ping_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result: Result<(), SessionError> = async {
        loop {
            tokio::select! {
                next = session.mailbox().recv() => {
                    let Some(event) = next else { break };
                    let text = codec.encode_text(&event)?;
                    write(config.write_wait, conn.send_text(&text)).await?;
                }
                _ = ticker.tick() => {
                    write(config.write_wait, conn.ping()).await?;
                }
            }
        }
        // Mailbox closed and drained: say goodbye.
        write(config.write_wait, conn.close()).await
    }
    .await;

    if let Err(e) = result {
        tracing::debug!(player = %session.name(), error = %e, "writer stopped");
    }
    session.close();
}

async fn write<F, E>(
    deadline: std::time::Duration,
    op: F,
) -> Result<(), SessionError>
where
    F: std::future::Future<Output = Result<(), E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    match time::timeout(deadline, op).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(SessionError::transport(e)),
        Err(_) => Err(SessionError::WriteTimeout(deadline)),
    }
}
