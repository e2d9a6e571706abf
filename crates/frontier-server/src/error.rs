//! Unified error type for the server.

use frontier_protocol::{PlayerId, ProtocolError};
use frontier_transport::TransportError;

/// Top-level server error.
///
/// Transport and protocol failures convert automatically through `?`.
/// The remaining variants are handshake outcomes; each one ends the
/// connection it happened on and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The [`Authenticator`](crate::Authenticator) rejected the token.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The client speaks a different protocol version.
    #[error("protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u32, actual: u32 },

    /// The first frame was something other than a login.
    #[error("expected login, got {0}")]
    ExpectedLogin(String),

    /// No login arrived within the handshake timeout, or the peer left.
    #[error("handshake did not complete: {0}")]
    Handshake(&'static str),

    /// The player already has a live connection.
    #[error("player {0} is already connected")]
    AlreadyConnected(PlayerId),

    /// The player's outbound queue overflowed; the connection was closed.
    #[error("outbound queue for {0} overflowed")]
    Overflow(PlayerId),
}

impl ServerError {
    /// The key of the error notice sent to the client before closing, for
    /// handshake failures the client can act on.
    pub(crate) fn notice_key(&self) -> Option<&'static str> {
        match self {
            Self::AuthFailed(_) => Some("error.login.unauthorized"),
            Self::VersionMismatch { .. } => Some("error.login.version"),
            Self::ExpectedLogin(_) => Some("error.login.expected"),
            Self::AlreadyConnected(_) => Some("error.login.alreadyConnected"),
            Self::Transport(_) | Self::Protocol(_) | Self::Handshake(_) | Self::Overflow(_) => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: ServerError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, ServerError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ServerError = ProtocolError::UnknownTag("moveTo".into()).into();
        assert!(matches!(err, ServerError::Protocol(_)));
        assert_eq!(err.notice_key(), None);
    }

    #[test]
    fn test_version_mismatch_message_names_both_versions() {
        let err = ServerError::VersionMismatch {
            expected: 1,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "protocol version mismatch: expected 1, got 7"
        );
        assert_eq!(err.notice_key(), Some("error.login.version"));
    }
}
