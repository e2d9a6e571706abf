//! The seam between the in-game controller and whatever shows things to
//! the player.

use frontier_protocol::{HandlerError, HighScore, NationSummary, PlayerId};
use tokio::sync::mpsc;

/// Receives what the client controller wants shown.
///
/// Failures are reported as [`HandlerError::Presentation`]; the session
/// logs them and carries on with the next message.
pub trait Presenter: Send {
    /// Show a high-score list. `key` is the display key from the message.
    fn show_high_scores(&mut self, key: String, scores: Vec<HighScore>) -> Result<(), HandlerError>;

    /// Show a user-visible notice from the server.
    fn show_notice(&mut self, key: String, message: String) -> Result<(), HandlerError>;

    /// A nation summary was cached; open reports may want to refresh.
    fn nation_summary_updated(
        &mut self,
        _player: PlayerId,
        _summary: &NationSummary,
    ) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Everything a [`ChannelPresenter`] forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    HighScores { key: String, scores: Vec<HighScore> },
    Notice { key: String, message: String },
    NationSummary { player: PlayerId },
}

/// A presenter that forwards every call to another task over a channel.
///
/// Lets a UI thread (or a test) consume what the receive loop produces.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<PresenterEvent>,
}

impl ChannelPresenter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PresenterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: PresenterEvent) -> Result<(), HandlerError> {
        self.tx
            .send(event)
            .map_err(|_| HandlerError::Presentation("presenter receiver is gone".into()))
    }
}

impl Presenter for ChannelPresenter {
    fn show_high_scores(&mut self, key: String, scores: Vec<HighScore>) -> Result<(), HandlerError> {
        self.forward(PresenterEvent::HighScores { key, scores })
    }

    fn show_notice(&mut self, key: String, message: String) -> Result<(), HandlerError> {
        self.forward(PresenterEvent::Notice { key, message })
    }

    fn nation_summary_updated(
        &mut self,
        player: PlayerId,
        _summary: &NationSummary,
    ) -> Result<(), HandlerError> {
        self.forward(PresenterEvent::NationSummary { player })
    }
}
