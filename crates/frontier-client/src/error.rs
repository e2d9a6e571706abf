//! Error type for the client.

use frontier_protocol::ProtocolError;
use frontier_transport::TransportError;

/// Errors a [`ClientSession`](crate::ClientSession) can return.
///
/// Handler failures are not here: the receive loop logs those and keeps
/// going.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server refused the login.
    #[error("login rejected ({key}): {message}")]
    Rejected { key: String, message: String },

    /// The server did not answer in time.
    #[error("timed out waiting for the server")]
    Timeout,

    /// The server closed the connection.
    #[error("connection closed by server")]
    Closed,
}
