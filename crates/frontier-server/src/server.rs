//! `FrontierServer` builder and accept loop.
//!
//! Ties the layers together: transport → session handler → controller →
//! fan-out.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use frontier_protocol::{ChangeSet, Codec, PlayerId, StreamCodec};
use frontier_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::outbox::Outlet;
use crate::{Authenticator, GameState, InGameController, ServerConfig, ServerError};

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) config: ServerConfig,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) handle: ServerHandle,
}

/// A cheap, cloneable handle on a running server.
///
/// Game-rule code holds one of these to reach the controller and to push
/// change sets it produced outside of message handling (a score recorded
/// at the end of a turn, say).
#[derive(Clone)]
pub struct ServerHandle {
    controller: Arc<InGameController>,
    outlets: Arc<Mutex<HashMap<PlayerId, Arc<Outlet>>>>,
}

impl ServerHandle {
    fn new(controller: InGameController) -> Self {
        Self {
            controller: Arc::new(controller),
            outlets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn controller(&self) -> &InGameController {
        &self.controller
    }

    /// Players with a live, logged-in connection.
    pub async fn connected_players(&self) -> Vec<PlayerId> {
        let mut players: Vec<_> = self.outlets.lock().await.keys().copied().collect();
        players.sort_unstable();
        players
    }

    /// Queues every change for every connected player it addresses.
    ///
    /// Each recipient gets its share of the set as one batch, so messages
    /// for the same player keep their order. Players who are not connected
    /// right now get nothing. A player whose outbox cannot take the batch
    /// is unregistered at once and their connection is closed.
    pub async fn deliver(&self, changes: ChangeSet) {
        if changes.is_empty() {
            return;
        }
        let mut outlets = self.outlets.lock().await;
        outlets.retain(|&player, outlet| {
            let batch: Vec<_> = changes.deliveries_for(player).cloned().collect();
            if batch.is_empty() {
                return true;
            }
            let count = batch.len();
            if outlet.push(batch) {
                return true;
            }
            tracing::warn!(%player, count, "outbox overflowed, disconnecting player");
            false
        });
    }

    pub(crate) async fn register(
        &self,
        player: PlayerId,
        capacity: usize,
    ) -> Result<Arc<Outlet>, ServerError> {
        let mut outlets = self.outlets.lock().await;
        if outlets.contains_key(&player) {
            return Err(ServerError::AlreadyConnected(player));
        }
        let outlet = Arc::new(Outlet::new(capacity));
        outlets.insert(player, Arc::clone(&outlet));
        Ok(outlet)
    }

    /// Removes the player's registration if it is still `outlet`. A newer
    /// login for the same player is left alone.
    pub(crate) async fn unregister(&self, player: PlayerId, outlet: &Arc<Outlet>) {
        let mut outlets = self.outlets.lock().await;
        if outlets
            .get(&player)
            .is_some_and(|current| Arc::ptr_eq(current, outlet))
        {
            outlets.remove(&player);
        }
    }
}

/// Builder for configuring and starting a Frontier server.
///
/// ```rust,ignore
/// let server = FrontierServer::builder()
///     .bind("0.0.0.0:7300")
///     .build(auth)
///     .await?;
/// server.handle().controller().with_state(|s| {
///     s.add_player(PlayerId(1), "Ana", "Portuguese");
/// });
/// server.run().await
/// ```
pub struct FrontierServerBuilder {
    config: ServerConfig,
}

impl FrontierServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener with the XML stream codec.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<FrontierServer<A, StreamCodec>, ServerError> {
        self.build_with_codec(auth, StreamCodec).await
    }

    /// Binds the listener with a caller-chosen codec.
    pub async fn build_with_codec<A: Authenticator, C: Codec>(
        self,
        auth: A,
        codec: C,
    ) -> Result<FrontierServer<A, C>, ServerError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let game = GameState::new(self.config.high_score_capacity);

        let state = Arc::new(ServerState {
            config: self.config,
            auth,
            codec,
            handle: ServerHandle::new(InGameController::new(game)),
        });

        Ok(FrontierServer { transport, state })
    }
}

impl Default for FrontierServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Frontier server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct FrontierServer<A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
}

impl FrontierServer<crate::TokenTable, StreamCodec> {
    /// Creates a new builder.
    pub fn builder() -> FrontierServerBuilder {
        FrontierServerBuilder::new()
    }
}

impl<A: Authenticator, C: Codec> FrontierServer<A, C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.transport.local_addr()?)
    }

    pub fn handle(&self) -> ServerHandle {
        self.state.handle.clone()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each accepted connection gets its own task; a failing connection
    /// never stops the loop.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!(addr = %self.config_addr(), "Frontier server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }

    fn config_addr(&self) -> String {
        self.local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| self.state.config.bind_addr.clone())
    }
}

#[cfg(test)]
mod tests {
    use frontier_protocol::{Audience, ErrorMessage, HighScoreMessage};

    use super::*;

    const ANA: PlayerId = PlayerId(1);
    const BO: PlayerId = PlayerId(2);

    fn handle() -> ServerHandle {
        ServerHandle::new(InGameController::new(GameState::new(10)))
    }

    #[tokio::test]
    async fn test_stale_unregister_keeps_newer_login() {
        let handle = handle();
        let old = handle.register(ANA, 4).await.unwrap();
        handle.unregister(ANA, &old).await;
        let new = handle.register(ANA, 4).await.unwrap();

        // The first connection's cleanup arrives late.
        handle.unregister(ANA, &old).await;

        assert_eq!(handle.connected_players().await, [ANA]);
        handle.unregister(ANA, &new).await;
        assert!(handle.connected_players().await.is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_player_is_unregistered_not_skipped() {
        let handle = handle();
        let ana = handle.register(ANA, 2).await.unwrap();
        let bo = handle.register(BO, 2).await.unwrap();

        handle
            .deliver(ChangeSet::only(ANA, HighScoreMessage::request("a")))
            .await;
        handle
            .deliver(
                ChangeSet::new()
                    .with(Audience::Player(ANA), HighScoreMessage::request("b"))
                    .with(Audience::All, ErrorMessage::new("error.x", "")),
            )
            .await;

        assert!(ana.is_overflowed());
        assert!(!bo.is_overflowed());
        assert_eq!(handle.connected_players().await, [BO]);
        // The player may log in again right away.
        assert!(handle.register(ANA, 2).await.is_ok());
    }
}
