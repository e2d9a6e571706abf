use crate::{Attributes, Fields, NoChildren, PlayerId, ProtocolError, Record};

/// First frame a client sends: protocol version and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginMessage {
    pub version: u32,
    pub token: String,
}

impl LoginMessage {
    pub fn new(version: u32, token: impl Into<String>) -> Self {
        Self {
            version,
            token: token.into(),
        }
    }
}

impl Record for LoginMessage {
    const TAG: &'static str = "login";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("version", self.version.to_string())
            .with("token", self.token.as_str())
    }

    fn from_parts(fields: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
        Ok(Self {
            version: fields.required("version")?,
            token: fields.string("token"),
        })
    }
}

/// The server's answer to a successful login: who the client is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WelcomeMessage {
    pub player: PlayerId,
}

impl Record for WelcomeMessage {
    const TAG: &'static str = "welcome";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        Attributes::new().with("player", self.player.to_attribute())
    }

    fn from_parts(fields: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
        Ok(Self {
            player: fields.required("player")?,
        })
    }
}
