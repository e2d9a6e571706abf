//! Per-connection handler: handshake, dispatch, and the writer task.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `login` → check version → authenticate → register
//!   2. Send `welcome` → player is connected
//!   3. Spawn the writer task draining the player's outbox
//!   4. Loop: receive → decode → server handler → deliver the change set
//!   5. Unregister once either loop ends

use std::sync::Arc;

use frontier_protocol::{
    AnyMessage, ChangeSet, Codec, ErrorMessage, LoginMessage, PlayerId, WelcomeMessage,
};
use frontier_transport::{Connection, WebSocketConnection};
use tracing::{debug, info, warn};

use crate::outbox::Outlet;
use crate::server::{ServerHandle, ServerState};
use crate::{Authenticator, ServerError};

/// Key of the notice sent back when a frame can't be decoded.
const MALFORMED_KEY: &str = "error.malformed";

/// Key of the last notice sent before an overflowing connection is closed.
const OVERFLOW_KEY: &str = "error.overflow";

/// Drop guard that unregisters a player if the handler unwinds.
///
/// The normal exit path unregisters synchronously and disarms the guard.
/// `Drop` can't await, so the fallback removal is spawned.
struct RegistrationGuard {
    player: PlayerId,
    outlet: Option<Arc<Outlet>>,
    handle: ServerHandle,
}

impl RegistrationGuard {
    async fn release(mut self) {
        if let Some(outlet) = self.outlet.take() {
            self.handle.unregister(self.player, &outlet).await;
        }
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        let Some(outlet) = self.outlet.take() else {
            return;
        };
        let player = self.player;
        let handle = self.handle.clone();
        tokio::spawn(async move {
            handle.unregister(player, &outlet).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), ServerError>
where
    A: Authenticator,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    debug!(%conn_id, "handling new connection");

    // --- Step 1: Handshake ---
    let (player, outlet) = match perform_handshake(&conn, &state).await {
        Ok(accepted) => accepted,
        Err(e) => {
            if let Some(key) = e.notice_key() {
                let notice = ErrorMessage::new(key, e.to_string());
                if let Ok(bytes) = state.codec.encode(&notice) {
                    let _ = conn.send(&bytes).await;
                }
            }
            let _ = conn.close().await;
            return Err(e);
        }
    };
    let guard = RegistrationGuard {
        player,
        outlet: Some(Arc::clone(&outlet)),
        handle: state.handle.clone(),
    };
    info!(%conn_id, %player, "player logged in");

    // --- Step 2: Writer ---
    let mut writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        outlet,
        Arc::clone(&state),
        player,
    ));

    // --- Step 3: Message loop, until either side stops ---
    let result = tokio::select! {
        result = read_loop(&conn, &state, player) => result,
        finished = &mut writer => match finished {
            Ok(result) => result,
            Err(e) => {
                warn!(%player, error = %e, "writer task failed");
                Ok(())
            }
        },
    };

    writer.abort();
    guard.release().await;
    result
}

/// Receives the login, validates it, and registers the player.
async fn perform_handshake<A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<A, C>,
) -> Result<(PlayerId, Arc<Outlet>), ServerError>
where
    A: Authenticator,
    C: Codec,
{
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => return Err(ServerError::Handshake("connection closed before login")),
        Ok(Err(e)) => return Err(ServerError::Transport(e)),
        Err(_) => return Err(ServerError::Handshake("login timed out")),
    };

    let login: LoginMessage = state
        .codec
        .decode(&data)
        .map_err(|e| ServerError::ExpectedLogin(e.to_string()))?;

    if login.version != state.config.protocol_version {
        return Err(ServerError::VersionMismatch {
            expected: state.config.protocol_version,
            actual: login.version,
        });
    }

    let player = state.auth.authenticate(&login.token).await?;
    let outlet = state
        .handle
        .register(player, state.config.outbound_capacity)
        .await?;

    let welcome = state.codec.encode(&WelcomeMessage { player })?;
    if let Err(e) = conn.send(&welcome).await {
        state.handle.unregister(player, &outlet).await;
        return Err(ServerError::Transport(e));
    }

    Ok((player, outlet))
}

/// Decodes and dispatches frames until the peer leaves or goes idle.
///
/// A frame that fails to decode is answered with an error notice and
/// skipped; it never ends the connection.
async fn read_loop<A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<A, C>,
    player: PlayerId,
) -> Result<(), ServerError>
where
    A: Authenticator,
    C: Codec,
{
    let handle = &state.handle;
    loop {
        let data = match tokio::time::timeout(state.config.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                info!(%player, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                debug!(%player, error = %e, "recv error");
                return Err(e.into());
            }
            Err(_) => {
                info!(%player, "connection timed out");
                return Ok(());
            }
        };

        let message: AnyMessage = match state.codec.decode(&data) {
            Ok(message) => message,
            Err(e) => {
                debug!(%player, error = %e, "failed to decode message");
                let notice = ErrorMessage::new(MALFORMED_KEY, e.to_string());
                handle.deliver(ChangeSet::only(player, notice)).await;
                continue;
            }
        };

        debug!(%player, tag = message.tag(), "dispatching");
        let changes = message.server_handler(handle.controller(), player);
        handle.deliver(changes).await;
    }
}

/// Drains the player's outbox onto the connection.
///
/// Once the outbox has overflowed, sends what is still queued, then a last
/// notice, and closes the connection.
async fn write_loop<A, C>(
    conn: Arc<WebSocketConnection>,
    outlet: Arc<Outlet>,
    state: Arc<ServerState<A, C>>,
    player: PlayerId,
) -> Result<(), ServerError>
where
    A: Authenticator,
    C: Codec,
{
    loop {
        while let Some(message) = outlet.pop() {
            let bytes = match state.codec.encode(&message) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(%player, tag = message.tag(), error = %e, "failed to encode message");
                    continue;
                }
            };
            if let Err(e) = conn.send(&bytes).await {
                debug!(%player, error = %e, "send failed, writer stopping");
                return Err(e.into());
            }
        }
        if outlet.is_overflowed() {
            let notice = ErrorMessage::new(OVERFLOW_KEY, "too many pending messages");
            if let Ok(bytes) = state.codec.encode(&notice) {
                let _ = conn.send(&bytes).await;
            }
            let _ = conn.close().await;
            return Err(ServerError::Overflow(player));
        }
        outlet.ready().await;
    }
}
