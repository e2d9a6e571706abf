//! Wire protocol for Frontier.
//!
//! This crate defines how game facts ("here are the current high scores")
//! and intents ("give me the high scores for key K") travel between a
//! client and the authoritative server:
//!
//! - **Records** ([`Record`], [`Document`]): the one declarative schema
//!   every message and domain record provides, with a fixed tag, ordered scalar
//!   attributes, and a list of typed child records.
//! - **Encodings** ([`Element`], [`StreamReader`], [`StreamWriter`]): the
//!   in-memory element tree and the forward-only XML cursor. Both are
//!   generic interpreters over the record schema.
//! - **Messages** ([`Message`], [`AnyMessage`]): concrete message types,
//!   each carrying a client handler and a server handler.
//! - **Changes** ([`ChangeSet`]): what server-side handling returns, an
//!   ordered list of messages addressed to audiences.
//! - **Codecs** ([`Codec`], [`StreamCodec`], [`TreeCodec`]): how documents
//!   become bytes for the transport.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Codec (AnyMessage) → Dispatch (client or server handler)
//!                                              ↓ server only
//!                                          ChangeSet → fan-out to audiences
//! ```
//!
//! The protocol layer knows nothing about sockets or game rules. Handlers
//! reach the game through the [`ClientController`] and [`ServerController`]
//! traits, which the client and server crates implement.

mod change;
mod codec;
mod element;
mod error;
mod message;
mod messages;
mod model;
mod record;
mod stream;
mod types;

pub use change::{Change, ChangeSet};
#[cfg(feature = "json")]
pub use codec::JsonTreeCodec;
pub use codec::{Codec, StreamCodec, TreeCodec};
pub use element::{Attributes, Element};
pub use error::{HandlerError, ProtocolError};
pub use message::{AnyMessage, ClientController, Message, ServerController};
pub use messages::{
    ErrorMessage, HighScoreMessage, LoginMessage, NationSummaryMessage,
    RetireMessage, WelcomeMessage,
};
pub use model::{HighScore, NationSummary, Stance};
pub use record::{Document, Fields, NoChildren, Record};
pub use stream::{StreamReader, StreamWriter};
pub use types::{Audience, PlayerId, Priority};

/// The current protocol version. Clients must send this in their
/// [`LoginMessage`] or be refused.
pub const PROTOCOL_VERSION: u32 = 1;
