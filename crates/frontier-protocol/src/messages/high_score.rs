use crate::{
    Attributes, ChangeSet, ClientController, Fields, HandlerError, HighScore,
    Message, PlayerId, Priority, ProtocolError, Record, ServerController,
};

/// Asks for, or carries, a high-score list.
///
/// The same type serves both directions:
///
/// - **request** (client → server): a key and no scores,
/// - **response** (server → client): the key echoed back with the scores,
///   best first.
///
/// On the wire there is no difference between "no scores yet" and "asked
/// for scores": both are an element with zero children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScoreMessage {
    /// Lookup key for the list, also used as a display key by the client.
    pub key: String,
    /// Scores in the order the server ranked them.
    pub scores: Vec<HighScore>,
}

impl HighScoreMessage {
    /// A request for the list under `key`.
    pub fn request(key: impl Into<String>) -> Self {
        Self::new(key, None)
    }

    /// A response carrying `scores` in the given order.
    pub fn response(key: impl Into<String>, scores: Vec<HighScore>) -> Self {
        Self::new(key, Some(scores))
    }

    /// `None` and an empty list both produce the request shape.
    pub fn new(key: impl Into<String>, scores: Option<Vec<HighScore>>) -> Self {
        Self {
            key: key.into(),
            scores: scores.unwrap_or_default(),
        }
    }

    /// `true` when this carries no scores, i.e. it has the request shape.
    pub fn is_request(&self) -> bool {
        self.scores.is_empty()
    }
}

impl Record for HighScoreMessage {
    const TAG: &'static str = "highScore";
    type Child = HighScore;

    fn attributes(&self) -> Attributes {
        Attributes::new().with("key", self.key.as_str())
    }

    fn children(&self) -> &[HighScore] {
        &self.scores
    }

    fn from_parts(fields: Fields<'_>, scores: Vec<HighScore>) -> Result<Self, ProtocolError> {
        Ok(Self {
            key: fields.string("key"),
            scores,
        })
    }
}

impl Message for HighScoreMessage {
    const PRIORITY: Priority = Priority::Normal;

    fn client_handler(self, client: &mut dyn ClientController) -> Result<(), HandlerError> {
        client.high_score_handler(self.key, self.scores)
    }

    fn server_handler(self, server: &dyn ServerController, sender: PlayerId) -> ChangeSet {
        server.get_high_scores(sender, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn score(name: &str, points: i32) -> HighScore {
        HighScore {
            player_name: name.into(),
            nation_name: "English".into(),
            score: points,
            turn: 1,
            retired: false,
        }
    }

    #[test]
    fn test_request_has_key_and_no_children() {
        let element = HighScoreMessage::new("report.highScores", None).to_element();
        assert_eq!(element.attribute("key"), Some("report.highScores"));
        assert!(element.children.is_empty());
    }

    #[test]
    fn test_empty_response_has_request_shape() {
        let message = HighScoreMessage::response("k", Vec::new());
        assert!(message.is_request());
        assert_eq!(message, HighScoreMessage::request("k"));
    }

    #[test]
    fn test_response_preserves_score_order() {
        let scores = vec![score("c", 1), score("a", 30), score("b", 20)];
        let xml = HighScoreMessage::response("k", scores.clone()).to_xml().unwrap();

        let decoded = HighScoreMessage::from_xml(&xml).unwrap();

        assert_eq!(decoded.scores, scores);
    }

    #[test]
    fn test_absent_key_decodes_to_empty_string() {
        let decoded = HighScoreMessage::from_xml("<highScore/>").unwrap();
        assert_eq!(decoded.key, "");
    }
}
