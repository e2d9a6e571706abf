//! # Frontier server
//!
//! The authoritative side of the game. Clients send intents ("give me the
//! high scores", "I retire"); the server decodes each one, runs its server
//! handler against the shared [`GameState`] through the
//! [`InGameController`], and delivers the resulting
//! [`ChangeSet`](frontier_protocol::ChangeSet) to every affected player.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frontier_protocol::PlayerId;
//! use frontier_server::{FrontierServer, TokenTable};
//!
//! # async fn start() -> Result<(), frontier_server::ServerError> {
//! let auth = TokenTable::new().with("secret", PlayerId(1));
//! let server = FrontierServer::builder()
//!     .bind("0.0.0.0:7300")
//!     .build(auth)
//!     .await?;
//! server.handle().controller().with_state(|game| {
//!     game.add_player(PlayerId(1), "Ana", "Portuguese");
//! });
//! server.run().await
//! # }
//! ```

mod auth;
mod config;
mod controller;
mod error;
mod handler;
mod outbox;
mod server;
mod state;

pub use auth::{Authenticator, TokenTable};
pub use config::ServerConfig;
pub use controller::InGameController;
pub use error::ServerError;
pub use outbox::Outbox;
pub use server::{FrontierServer, FrontierServerBuilder, ServerHandle};
pub use state::{GameState, PlayerEntry};
