//! The client's end of a connection.
//!
//! A session logs in once, then offers two halves that may run on
//! different tasks: senders ([`send`](ClientSession::send) and the request
//! helpers) and the receive loop ([`run`](ClientSession::run)).

use frontier_protocol::{
    AnyMessage, ClientController, Codec, ErrorMessage, HighScoreMessage, LoginMessage,
    NationSummaryMessage, PlayerId, RetireMessage, StreamCodec, WelcomeMessage,
};
use frontier_transport::{ClientConnection, Connection, connect};
use tracing::{debug, info, warn};

use crate::{ClientConfig, ClientError};

/// A logged-in connection to a Frontier server.
pub struct ClientSession<C: Codec = StreamCodec> {
    conn: ClientConnection,
    codec: C,
    player: PlayerId,
}

impl ClientSession<StreamCodec> {
    /// Connects and logs in with the XML stream codec.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::connect_with_codec(config, StreamCodec).await
    }
}

impl<C: Codec> ClientSession<C> {
    /// Connects to `config.url` and performs the login handshake.
    ///
    /// # Errors
    /// `Rejected` if the server answers with an error notice, `Timeout` or
    /// `Closed` if it doesn't answer at all.
    pub async fn connect_with_codec(config: &ClientConfig, codec: C) -> Result<Self, ClientError> {
        let conn = connect(&config.url).await?;

        let login = LoginMessage::new(config.protocol_version, config.token.as_str());
        conn.send(&codec.encode(&login)?).await?;

        let reply = match tokio::time::timeout(config.receive_timeout, conn.recv()).await {
            Ok(Ok(Some(reply))) => reply,
            Ok(Ok(None)) => return Err(ClientError::Closed),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ClientError::Timeout),
        };

        let player = match codec.decode::<WelcomeMessage>(&reply) {
            Ok(welcome) => welcome.player,
            Err(welcome_err) => {
                return Err(match codec.decode::<ErrorMessage>(&reply) {
                    Ok(notice) => ClientError::Rejected {
                        key: notice.key,
                        message: notice.message,
                    },
                    Err(_) => welcome_err.into(),
                });
            }
        };

        info!(%player, url = %config.url, "logged in");
        Ok(Self {
            conn,
            codec,
            player,
        })
    }

    /// The identity the server assigned at login.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Encodes and sends one message.
    pub async fn send(&self, message: impl Into<AnyMessage>) -> Result<(), ClientError> {
        let message = message.into();
        debug!(tag = message.tag(), "sending");
        let bytes = self.codec.encode(&message)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// Asks for the high-score list under `key`.
    pub async fn request_high_scores(&self, key: &str) -> Result<(), ClientError> {
        self.send(HighScoreMessage::request(key)).await
    }

    /// Asks for the nation summary of `player`.
    pub async fn request_nation_summary(&self, player: PlayerId) -> Result<(), ClientError> {
        self.send(NationSummaryMessage::request(player)).await
    }

    pub async fn retire(&self) -> Result<(), ClientError> {
        self.send(RetireMessage).await
    }

    /// Waits for the next message.
    ///
    /// Returns `Ok(None)` once the server closes the connection. A frame
    /// that fails to decode is returned as an error; the connection stays
    /// usable.
    pub async fn receive(&self) -> Result<Option<AnyMessage>, ClientError> {
        match self.conn.recv().await? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Runs the receive loop, dispatching every message to `controller`,
    /// until the server closes the connection.
    ///
    /// Undecodable frames and handler failures are logged and skipped;
    /// neither ends the loop. Transport errors do.
    pub async fn run(&self, controller: &mut dyn ClientController) -> Result<(), ClientError> {
        loop {
            let message = match self.receive().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!(player = %self.player, "server closed the connection");
                    return Ok(());
                }
                Err(ClientError::Protocol(e)) => {
                    warn!(error = %e, "dropping undecodable message");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let tag = message.tag();
            if let Err(e) = message.client_handler(controller) {
                warn!(tag, error = %e, "client handler failed");
            }
        }
    }

    /// Closes the connection.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.conn.close().await?;
        Ok(())
    }
}
