use crate::{
    Attributes, ChangeSet, ClientController, Fields, HandlerError, Message,
    NationSummary, PlayerId, Priority, ProtocolError, Record, ServerController,
};

/// Asks for, or carries, the summary of one foreign nation.
///
/// The request names the player whose nation is wanted; the response is
/// the same message with exactly one [`NationSummary`] child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationSummaryMessage {
    /// The player whose nation is summarized.
    pub player: PlayerId,
    pub summary: Option<NationSummary>,
}

impl NationSummaryMessage {
    pub fn request(player: PlayerId) -> Self {
        Self {
            player,
            summary: None,
        }
    }

    pub fn response(player: PlayerId, summary: NationSummary) -> Self {
        Self {
            player,
            summary: Some(summary),
        }
    }
}

impl Record for NationSummaryMessage {
    const TAG: &'static str = "nationSummary";
    type Child = NationSummary;

    fn attributes(&self) -> Attributes {
        Attributes::new().with("player", self.player.to_attribute())
    }

    fn children(&self) -> &[NationSummary] {
        self.summary.as_slice()
    }

    fn from_parts(fields: Fields<'_>, summaries: Vec<NationSummary>) -> Result<Self, ProtocolError> {
        if summaries.len() > 1 {
            return Err(ProtocolError::InvalidMessage(format!(
                "<{}> carries {} summaries, at most one allowed",
                Self::TAG,
                summaries.len()
            )));
        }
        Ok(Self {
            player: fields.required("player")?,
            summary: summaries.into_iter().next(),
        })
    }
}

impl Message for NationSummaryMessage {
    // Report data; anything else may overtake it.
    const PRIORITY: Priority = Priority::Trivial;

    fn client_handler(self, client: &mut dyn ClientController) -> Result<(), HandlerError> {
        match self.summary {
            Some(summary) => client.nation_summary_handler(self.player, summary),
            None => Err(HandlerError::UnexpectedMessage("nation summary request")),
        }
    }

    fn server_handler(self, server: &dyn ServerController, sender: PlayerId) -> ChangeSet {
        server.get_nation_summary(sender, self.player)
    }
}
