use tracing::warn;

use crate::{
    Attributes, ChangeSet, ClientController, Fields, HandlerError, Message,
    NoChildren, PlayerId, Priority, ProtocolError, Record, ServerController,
};

/// A user-visible notice from the server: a refusal, a failed lookup, a
/// message that could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Message key for the client's localized text.
    pub key: String,
    /// Plain-text fallback.
    pub message: String,
}

impl ErrorMessage {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl Record for ErrorMessage {
    const TAG: &'static str = "error";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("key", self.key.as_str())
            .with("message", self.message.as_str())
    }

    fn from_parts(fields: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
        Ok(Self {
            key: fields.string("key"),
            message: fields.string("message"),
        })
    }
}

impl Message for ErrorMessage {
    const PRIORITY: Priority = Priority::Urgent;

    fn client_handler(self, client: &mut dyn ClientController) -> Result<(), HandlerError> {
        client.error_handler(self.key, self.message)
    }

    /// Clients have nothing to report to the server; the notice is logged
    /// and dropped.
    fn server_handler(self, _server: &dyn ServerController, sender: PlayerId) -> ChangeSet {
        warn!(player = %sender, key = %self.key, "client sent an error notice");
        ChangeSet::new()
    }
}
