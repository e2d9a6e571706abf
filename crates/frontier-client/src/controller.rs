//! The client-side in-game controller.

use std::collections::BTreeMap;

use frontier_protocol::{ClientController, HandlerError, HighScore, NationSummary, PlayerId};
use tracing::debug;

use crate::{ForeignAffairsReport, Presenter};

/// Applies incoming messages to client-local state and the presenter.
///
/// High-score lists and notices go straight to the presenter, unchanged.
/// Nation summaries are cached so reports can be rebuilt at any time
/// without asking the server again.
#[derive(Debug)]
pub struct InGameClient<P: Presenter> {
    presenter: P,
    summaries: BTreeMap<PlayerId, NationSummary>,
}

impl<P: Presenter> InGameClient<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            summaries: BTreeMap::new(),
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// The last summary received for `player`.
    pub fn nation_summary(&self, player: PlayerId) -> Option<&NationSummary> {
        self.summaries.get(&player)
    }

    /// The foreign-affairs report over every cached summary.
    pub fn foreign_affairs(&self) -> ForeignAffairsReport {
        ForeignAffairsReport::from_summaries(self.summaries.iter().map(|(&p, s)| (p, s)))
    }
}

impl<P: Presenter> ClientController for InGameClient<P> {
    fn high_score_handler(
        &mut self,
        key: String,
        scores: Vec<HighScore>,
    ) -> Result<(), HandlerError> {
        debug!(key, count = scores.len(), "high scores received");
        self.presenter.show_high_scores(key, scores)
    }

    fn nation_summary_handler(
        &mut self,
        player: PlayerId,
        summary: NationSummary,
    ) -> Result<(), HandlerError> {
        let shown = self.presenter.nation_summary_updated(player, &summary);
        self.summaries.insert(player, summary);
        shown
    }

    fn error_handler(&mut self, key: String, message: String) -> Result<(), HandlerError> {
        debug!(key, message, "server notice");
        self.presenter.show_notice(key, message)
    }
}

#[cfg(test)]
mod tests {
    use frontier_protocol::{
        AnyMessage, ErrorMessage, HighScoreMessage, NationSummaryMessage, Stance,
    };

    use super::*;
    use crate::{ChannelPresenter, PresenterEvent};

    fn score(name: &str) -> HighScore {
        HighScore {
            player_name: name.into(),
            nation_name: "Spanish".into(),
            score: 5,
            turn: 9,
            retired: false,
        }
    }

    #[test]
    fn test_high_scores_are_forwarded_unchanged() {
        let (presenter, mut rx) = ChannelPresenter::channel();
        let mut client = InGameClient::new(presenter);
        let scores = vec![score("b"), score("a")];

        AnyMessage::from(HighScoreMessage::response("report.highScores", scores.clone()))
            .client_handler(&mut client)
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            PresenterEvent::HighScores {
                key: "report.highScores".into(),
                scores,
            }
        );
    }

    #[test]
    fn test_nation_summary_is_cached_and_reported() {
        let (presenter, mut rx) = ChannelPresenter::channel();
        let mut client = InGameClient::new(presenter);
        let summary = NationSummary {
            stance: Stance::Alliance,
            ..NationSummary::default()
        };

        AnyMessage::from(NationSummaryMessage::response(PlayerId(4), summary.clone()))
            .client_handler(&mut client)
            .unwrap();

        assert_eq!(client.nation_summary(PlayerId(4)), Some(&summary));
        assert_eq!(
            rx.try_recv().unwrap(),
            PresenterEvent::NationSummary { player: PlayerId(4) }
        );
        let report = client.foreign_affairs();
        assert_eq!(
            report.nation(PlayerId(4)).and_then(|n| n.value("report.stance")),
            Some("model.stance.alliance")
        );
    }

    #[test]
    fn test_newer_summary_replaces_cached_one() {
        let (presenter, _rx) = ChannelPresenter::channel();
        let mut client = InGameClient::new(presenter);

        for gold in [100, 250] {
            let summary = NationSummary {
                gold,
                ..NationSummary::default()
            };
            client.nation_summary_handler(PlayerId(1), summary).unwrap();
        }

        assert_eq!(client.nation_summary(PlayerId(1)).map(|s| s.gold), Some(250));
    }

    #[test]
    fn test_notice_reaches_presenter() {
        let (presenter, mut rx) = ChannelPresenter::channel();
        let mut client = InGameClient::new(presenter);

        AnyMessage::from(ErrorMessage::new("error.unauthorized", "no"))
            .client_handler(&mut client)
            .unwrap();

        assert!(matches!(
            rx.try_recv(),
            Ok(PresenterEvent::Notice { ref key, .. }) if key == "error.unauthorized"
        ));
    }

    #[test]
    fn test_missing_presenter_target_is_a_handler_error() {
        let (presenter, rx) = ChannelPresenter::channel();
        drop(rx);
        let mut client = InGameClient::new(presenter);

        let result = client.high_score_handler("k".into(), Vec::new());

        assert!(matches!(result, Err(HandlerError::Presentation(_))));
    }

    #[test]
    fn test_summary_request_is_not_a_valid_client_message() {
        let (presenter, _rx) = ChannelPresenter::channel();
        let mut client = InGameClient::new(presenter);

        let result = AnyMessage::from(NationSummaryMessage::request(PlayerId(1)))
            .client_handler(&mut client);

        assert!(matches!(result, Err(HandlerError::UnexpectedMessage(_))));
        assert!(client.nation_summary(PlayerId(1)).is_none());
    }
}
