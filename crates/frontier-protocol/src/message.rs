//! Messages and their dispatch pair.
//!
//! A message is a [`Record`] that also knows what to do once it arrives.
//! Every concrete message type implements two independent handlers:
//!
//! - [`Message::client_handler`] runs on the client and applies the
//!   message to client-local state through a [`ClientController`].
//! - [`Message::server_handler`] runs on the server, receives the
//!   authenticated sender, and returns a [`ChangeSet`] saying who must be
//!   told what.
//!
//! The session on each side knows its own role at compile time and calls
//! exactly one of the two. [`AnyMessage`] is the tag → type registry the
//! sessions decode into.

use crate::{
    ChangeSet, Document, Element, ErrorMessage, HandlerError, HighScore,
    HighScoreMessage, NationSummary, NationSummaryMessage, PlayerId,
    Priority, ProtocolError, Record, RetireMessage, StreamReader,
    StreamWriter,
};

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

/// The client-side in-game controller, as seen by message handlers.
///
/// Implementations route results to the UI. They must not send protocol
/// traffic from inside these calls; any follow-up request is a new message
/// sent by the caller afterwards.
pub trait ClientController {
    /// A high-score list arrived (response to a request, or a broadcast).
    fn high_score_handler(
        &mut self,
        key: String,
        scores: Vec<HighScore>,
    ) -> Result<(), HandlerError>;

    /// A nation summary for `player` arrived.
    fn nation_summary_handler(
        &mut self,
        player: PlayerId,
        summary: NationSummary,
    ) -> Result<(), HandlerError>;

    /// The server sent a user-visible notice.
    fn error_handler(&mut self, key: String, message: String) -> Result<(), HandlerError>;
}

/// The server-side in-game controller, as seen by message handlers.
///
/// Each call is one critical section over the shared game state. The
/// returned [`ChangeSet`] is freshly built and owned by the caller.
pub trait ServerController: Send + Sync {
    /// Builds the high-score response for `sender`.
    fn get_high_scores(&self, sender: PlayerId, key: &str) -> ChangeSet;

    /// Builds the nation summary of `player` as seen by `sender`.
    fn get_nation_summary(&self, sender: PlayerId, player: PlayerId) -> ChangeSet;

    /// Retires `sender` from the game, recording their score.
    fn retire(&self, sender: PlayerId) -> ChangeSet;
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A record that can be dispatched on either side of the connection.
pub trait Message: Record {
    /// Send priority. Depends only on the type, never on the instance.
    const PRIORITY: Priority;

    /// Applies this message on the client.
    fn client_handler(self, client: &mut dyn ClientController) -> Result<(), HandlerError>;

    /// Performs this message on the server on behalf of `sender`.
    fn server_handler(self, server: &dyn ServerController, sender: PlayerId) -> ChangeSet;
}

// ---------------------------------------------------------------------------
// AnyMessage
// ---------------------------------------------------------------------------

/// Every message type that can arrive after the handshake.
///
/// Decoding looks at the root tag and hands the document to the matching
/// type's own decoder. An unknown tag is an error, not a skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyMessage {
    HighScore(HighScoreMessage),
    NationSummary(NationSummaryMessage),
    Error(ErrorMessage),
    Retire(RetireMessage),
}

impl AnyMessage {
    /// Every tag this registry can decode.
    pub const TAGS: [&'static str; 4] = [
        HighScoreMessage::TAG,
        NationSummaryMessage::TAG,
        ErrorMessage::TAG,
        RetireMessage::TAG,
    ];

    /// The wire tag of the wrapped message.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::HighScore(_) => HighScoreMessage::TAG,
            Self::NationSummary(_) => NationSummaryMessage::TAG,
            Self::Error(_) => ErrorMessage::TAG,
            Self::Retire(_) => RetireMessage::TAG,
        }
    }

    /// The send priority of the wrapped message's type.
    pub fn priority(&self) -> Priority {
        match self {
            Self::HighScore(_) => HighScoreMessage::PRIORITY,
            Self::NationSummary(_) => NationSummaryMessage::PRIORITY,
            Self::Error(_) => ErrorMessage::PRIORITY,
            Self::Retire(_) => RetireMessage::PRIORITY,
        }
    }

    /// Client half of the dispatch pair.
    pub fn client_handler(self, client: &mut dyn ClientController) -> Result<(), HandlerError> {
        match self {
            Self::HighScore(m) => m.client_handler(client),
            Self::NationSummary(m) => m.client_handler(client),
            Self::Error(m) => m.client_handler(client),
            Self::Retire(m) => m.client_handler(client),
        }
    }

    /// Server half of the dispatch pair.
    pub fn server_handler(self, server: &dyn ServerController, sender: PlayerId) -> ChangeSet {
        match self {
            Self::HighScore(m) => m.server_handler(server, sender),
            Self::NationSummary(m) => m.server_handler(server, sender),
            Self::Error(m) => m.server_handler(server, sender),
            Self::Retire(m) => m.server_handler(server, sender),
        }
    }
}

impl Document for AnyMessage {
    fn to_element(&self) -> Element {
        match self {
            Self::HighScore(m) => m.to_element(),
            Self::NationSummary(m) => m.to_element(),
            Self::Error(m) => m.to_element(),
            Self::Retire(m) => m.to_element(),
        }
    }

    fn from_element(element: &Element) -> Result<Self, ProtocolError> {
        match element.name.as_str() {
            HighScoreMessage::TAG => HighScoreMessage::from_element(element).map(Self::from),
            NationSummaryMessage::TAG => {
                NationSummaryMessage::from_element(element).map(Self::from)
            }
            ErrorMessage::TAG => ErrorMessage::from_element(element).map(Self::from),
            RetireMessage::TAG => RetireMessage::from_element(element).map(Self::from),
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }

    fn write(&self, out: &mut StreamWriter) -> Result<(), ProtocolError> {
        match self {
            Self::HighScore(m) => m.write(out),
            Self::NationSummary(m) => m.write(out),
            Self::Error(m) => m.write(out),
            Self::Retire(m) => m.write(out),
        }
    }

    fn read(input: &mut StreamReader<'_>) -> Result<Self, ProtocolError> {
        let tag = match input.peek_tag()? {
            Some(tag) => tag.to_string(),
            None => return Err(ProtocolError::UnexpectedEof),
        };
        match tag.as_str() {
            HighScoreMessage::TAG => HighScoreMessage::read(input).map(Self::from),
            NationSummaryMessage::TAG => NationSummaryMessage::read(input).map(Self::from),
            ErrorMessage::TAG => ErrorMessage::read(input).map(Self::from),
            RetireMessage::TAG => RetireMessage::read(input).map(Self::from),
            _ => Err(ProtocolError::UnknownTag(tag)),
        }
    }
}

impl From<HighScoreMessage> for AnyMessage {
    fn from(m: HighScoreMessage) -> Self {
        Self::HighScore(m)
    }
}

impl From<NationSummaryMessage> for AnyMessage {
    fn from(m: NationSummaryMessage) -> Self {
        Self::NationSummary(m)
    }
}

impl From<ErrorMessage> for AnyMessage {
    fn from(m: ErrorMessage) -> Self {
        Self::Error(m)
    }
}

impl From<RetireMessage> for AnyMessage {
    fn from(m: RetireMessage) -> Self {
        Self::Retire(m)
    }
}
