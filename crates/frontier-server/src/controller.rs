//! The server-side in-game controller.
//!
//! Message server handlers call into this through the
//! [`ServerController`] trait. Every call takes the state lock once, does
//! its reads and writes, builds a fresh [`ChangeSet`] and releases the
//! lock before anything is sent.

use std::sync::{Mutex, MutexGuard, PoisonError};

use frontier_protocol::{
    Audience, ChangeSet, HandlerError, HighScore, HighScoreMessage,
    NationSummaryMessage, PlayerId, ServerController,
};
use tracing::{debug, info, warn};

use crate::GameState;

/// Implements [`ServerController`] over a shared [`GameState`].
///
/// Authorization rule: acting on the game (asking for a nation summary,
/// retiring, recording a score) requires an active roster player. Any
/// authenticated connection, spectators included, may read the high-score
/// table.
#[derive(Debug)]
pub struct InGameController {
    state: Mutex<GameState>,
}

impl InGameController {
    /// Key of the message telling a player which score was just recorded.
    pub const RECORDED_KEY: &'static str = "highScores.recorded";
    /// Key of the refreshed leaderboard pushed to everyone.
    pub const UPDATED_KEY: &'static str = "highScores.updated";

    pub fn new(state: GameState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Runs `f` with exclusive access to the game state.
    ///
    /// Game-rule code uses this to feed in scores, summaries and turns.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Records `score` for `sender` and announces it.
    ///
    /// The sender first gets the new record on its own, then every player
    /// gets the refreshed table, in that order. Senders who are not active
    /// players are refused.
    pub fn record_score(&self, sender: PlayerId, score: HighScore) -> ChangeSet {
        let mut state = self.lock();
        if let Err(e) = authorize(&state, sender, "record a score") {
            return refuse(sender, &e);
        }
        publish_score(&mut state, sender, score)
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        // Poisoned state is still served.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ServerController for InGameController {
    fn get_high_scores(&self, sender: PlayerId, key: &str) -> ChangeSet {
        let state = self.lock();
        debug!(%sender, key, entries = state.high_scores().len(), "high scores requested");
        ChangeSet::only(
            sender,
            HighScoreMessage::response(key, state.high_scores().to_vec()),
        )
    }

    fn get_nation_summary(&self, sender: PlayerId, player: PlayerId) -> ChangeSet {
        let state = self.lock();
        if let Err(e) = authorize(&state, sender, "view nation summaries") {
            return refuse(sender, &e);
        }
        match state.summary(player) {
            Some(summary) => ChangeSet::only(
                sender,
                NationSummaryMessage::response(player, summary.clone()),
            ),
            None => {
                let e = HandlerError::LookupFailed {
                    what: "nation summary",
                    key: player.to_string(),
                };
                debug!(%sender, %player, "no nation summary");
                ChangeSet::refusal(sender, &e)
            }
        }
    }

    fn retire(&self, sender: PlayerId) -> ChangeSet {
        let mut state = self.lock();
        if let Err(e) = authorize(&state, sender, "retire") {
            return refuse(sender, &e);
        }
        match state.retire(sender) {
            Some(score) => {
                info!(%sender, score = score.score, "player retired");
                publish_score(&mut state, sender, score)
            }
            None => ChangeSet::new(),
        }
    }
}

fn authorize(state: &GameState, sender: PlayerId, action: &'static str) -> Result<(), HandlerError> {
    if state.is_active_player(sender) {
        Ok(())
    } else {
        Err(HandlerError::Unauthorized {
            player: sender,
            action,
        })
    }
}

fn refuse(sender: PlayerId, error: &HandlerError) -> ChangeSet {
    warn!(%sender, error = %error, "request refused");
    ChangeSet::refusal(sender, error)
}

fn publish_score(state: &mut GameState, sender: PlayerId, score: HighScore) -> ChangeSet {
    let rank = state.insert_high_score(score.clone());
    info!(%sender, score = score.score, ?rank, "score recorded");
    ChangeSet::new()
        .with(
            Audience::Player(sender),
            HighScoreMessage::response(InGameController::RECORDED_KEY, vec![score]),
        )
        .with(
            Audience::All,
            HighScoreMessage::response(
                InGameController::UPDATED_KEY,
                state.high_scores().to_vec(),
            ),
        )
}

#[cfg(test)]
mod tests {
    use frontier_protocol::{AnyMessage, NationSummary, Stance};

    use super::*;

    const ANA: PlayerId = PlayerId(1);
    const BO: PlayerId = PlayerId(2);
    const GHOST: PlayerId = PlayerId(99);

    fn controller() -> InGameController {
        let mut state = GameState::new(5);
        state
            .add_player(ANA, "Ana", "Portuguese")
            .add_player(BO, "Bo", "Swedish");
        state.set_summary(
            BO,
            NationSummary {
                stance: Stance::War,
                gold: 400,
                ..NationSummary::default()
            },
        );
        InGameController::new(state)
    }

    fn score(name: &str, points: i32) -> HighScore {
        HighScore {
            player_name: name.into(),
            nation_name: "Dutch".into(),
            score: points,
            turn: 1,
            retired: false,
        }
    }

    fn only_message(changes: &ChangeSet, to: PlayerId) -> &AnyMessage {
        assert_eq!(changes.len(), 1, "expected exactly one change: {changes:?}");
        let change = changes.iter().next().unwrap();
        assert_eq!(change.audience, Audience::Player(to));
        &change.message
    }

    fn error_key(message: &AnyMessage) -> &str {
        match message {
            AnyMessage::Error(e) => &e.key,
            other => panic!("expected error notice, got {other:?}"),
        }
    }

    // =====================================================================
    // get_high_scores
    // =====================================================================

    #[test]
    fn test_get_high_scores_answers_sender_with_ranked_table() {
        let controller = controller();
        controller.with_state(|s| {
            s.insert_high_score(score("low", 10));
            s.insert_high_score(score("high", 90));
        });

        let changes = controller.get_high_scores(ANA, "report.highScores");

        match only_message(&changes, ANA) {
            AnyMessage::HighScore(m) => {
                assert_eq!(m.key, "report.highScores");
                let names: Vec<_> = m.scores.iter().map(|s| s.player_name.as_str()).collect();
                assert_eq!(names, ["high", "low"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_get_high_scores_open_to_spectators() {
        let changes = controller().get_high_scores(GHOST, "k");
        assert!(matches!(only_message(&changes, GHOST), AnyMessage::HighScore(_)));
    }

    // =====================================================================
    // get_nation_summary
    // =====================================================================

    #[test]
    fn test_get_nation_summary_returns_stored_summary() {
        let changes = controller().get_nation_summary(ANA, BO);

        match only_message(&changes, ANA) {
            AnyMessage::NationSummary(m) => {
                assert_eq!(m.player, BO);
                assert_eq!(m.summary.as_ref().map(|s| s.stance), Some(Stance::War));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_get_nation_summary_unknown_player_is_lookup_notice() {
        let changes = controller().get_nation_summary(ANA, GHOST);
        assert_eq!(error_key(only_message(&changes, ANA)), "error.lookupFailed");
    }

    #[test]
    fn test_get_nation_summary_from_spectator_is_refused_without_state_change() {
        let changes = controller().get_nation_summary(GHOST, BO);
        assert_eq!(error_key(only_message(&changes, GHOST)), "error.unauthorized");
    }

    // =====================================================================
    // record_score / retire
    // =====================================================================

    #[test]
    fn test_record_score_notifies_scorer_then_everyone() {
        let controller = controller();

        let changes = controller.record_score(ANA, score("Ana", 70));

        let parts: Vec<_> = changes
            .iter()
            .map(|c| match &c.message {
                AnyMessage::HighScore(m) => (c.audience.clone(), m.key.clone(), m.scores.len()),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            parts,
            [
                (Audience::Player(ANA), "highScores.recorded".to_string(), 1),
                (Audience::All, "highScores.updated".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_record_score_from_non_player_is_refused_and_table_untouched() {
        let controller = controller();

        let changes = controller.record_score(GHOST, score("ghost", 1_000));

        assert_eq!(error_key(only_message(&changes, GHOST)), "error.unauthorized");
        assert!(controller.with_state(|s| s.high_scores().is_empty()));
    }

    #[test]
    fn test_retire_records_current_score_and_deactivates() {
        let controller = controller();
        controller.with_state(|s| s.set_score(ANA, 55));

        let changes = controller.retire(ANA);

        assert_eq!(changes.len(), 2);
        let table = controller.with_state(|s| s.high_scores().to_vec());
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].score, 55);
        assert!(table[0].retired);

        // A retired player can no longer act.
        let again = controller.retire(ANA);
        assert_eq!(error_key(only_message(&again, ANA)), "error.unauthorized");
    }
}
