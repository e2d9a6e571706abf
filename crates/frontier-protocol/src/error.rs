//! Error types for the protocol layer.
//!
//! Two families live here:
//!
//! - [`ProtocolError`]: the bytes or the document shape are wrong. Always
//!   fatal to the single message being decoded, never to the connection.
//! - [`HandlerError`]: the message decoded fine, but a handler refused or
//!   failed to act on it (unauthorized sender, missing data, a client
//!   presentation target that is gone).

use crate::PlayerId;

/// Errors that can occur while encoding or decoding a record.
///
/// Decoding is all-or-nothing: when any of these is returned, no partially
/// built value escapes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A tag other than the one the schema declares was found.
    ///
    /// `expected` and `actual` are element names. A closing tag is written
    /// with a leading slash, e.g. `"/highScore"`.
    #[error("unexpected tag: expected <{expected}>, found <{actual}>")]
    UnexpectedTag { expected: String, actual: String },

    /// A top-level element whose tag names no known message type.
    #[error("unknown message tag <{0}>")]
    UnknownTag(String),

    /// A mandatory attribute was absent.
    #[error("<{tag}> is missing required attribute `{attribute}`")]
    MissingAttribute { tag: String, attribute: String },

    /// An attribute was present but its value could not be parsed.
    #[error("<{tag}> attribute `{attribute}` has unreadable value {value:?}")]
    MalformedAttribute {
        tag: String,
        attribute: String,
        value: String,
    },

    /// The document ended before the current element was closed.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// The XML itself is not well formed (bad syntax, duplicate
    /// attributes, stray text, trailing content).
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Writing a document failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Serializing an element tree to JSON failed.
    #[cfg(feature = "json")]
    #[error("json encode failed: {0}")]
    JsonEncode(serde_json::Error),

    /// Parsing an element tree from JSON failed.
    #[cfg(feature = "json")]
    #[error("json decode failed: {0}")]
    JsonDecode(serde_json::Error),

    /// The document is well formed but violates a message rule, e.g. a
    /// nation summary response carrying two summaries.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Errors raised by message handlers.
///
/// Server-side, these never escape as errors: the controller turns them
/// into a [`ChangeSet`](crate::ChangeSet) carrying an
/// [`ErrorMessage`](crate::ErrorMessage) for the sender only
/// (see [`ChangeSet::refusal`](crate::ChangeSet::refusal)). Client-side,
/// the session logs them and moves on to the next message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The sender is not allowed to perform this operation.
    #[error("player {player} is not authorized to {action}")]
    Unauthorized {
        player: PlayerId,
        action: &'static str,
    },

    /// The request named something the server has no data for.
    #[error("no {what} found for {key}")]
    LookupFailed { what: &'static str, key: String },

    /// A message arrived on the side that never handles it, e.g. a
    /// request-form message decoded by a client.
    #[error("<{0}> is not handled on this side of the connection")]
    UnexpectedMessage(&'static str),

    /// The client's presentation layer could not show the result.
    #[error("presentation failed: {0}")]
    Presentation(String),
}

impl HandlerError {
    /// The message key a client uses to look up a localized notice.
    pub fn notice_key(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "error.unauthorized",
            Self::LookupFailed { .. } => "error.lookupFailed",
            Self::UnexpectedMessage(_) => "error.unexpectedMessage",
            Self::Presentation(_) => "error.presentation",
        }
    }
}
