use crate::{
    Attributes, ChangeSet, ClientController, Fields, HandlerError, Message,
    NoChildren, PlayerId, Priority, ProtocolError, Record, ServerController,
};

/// The sender gives up and leaves the game, banking their current score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetireMessage;

impl Record for RetireMessage {
    const TAG: &'static str = "retire";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    fn from_parts(_: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
        Ok(Self)
    }
}

impl Message for RetireMessage {
    const PRIORITY: Priority = Priority::Normal;

    fn client_handler(self, _client: &mut dyn ClientController) -> Result<(), HandlerError> {
        Err(HandlerError::UnexpectedMessage(Self::TAG))
    }

    fn server_handler(self, server: &dyn ServerController, sender: PlayerId) -> ChangeSet {
        server.retire(sender)
    }
}
