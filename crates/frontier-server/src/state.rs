//! The shared game state the in-game controller reads and mutates.
//!
//! Only what message handling needs lives here: who is playing, the
//! high-score table, and the nation summaries each player may be shown.
//! Game rules that produce scores and summaries run elsewhere and feed
//! their results in through the setters.

use std::collections::BTreeMap;

use frontier_protocol::{HighScore, NationSummary, PlayerId};

/// One registered player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub name: String,
    pub nation: String,
    /// Current running score.
    pub score: i32,
    /// Set once the player retires; a retired player stays on the roster
    /// so their name still resolves, but can't act.
    pub retired: bool,
}

/// Server-side game state.
///
/// Not thread-safe by itself; the controller owns it behind a mutex.
#[derive(Debug, Clone)]
pub struct GameState {
    players: BTreeMap<PlayerId, PlayerEntry>,
    summaries: BTreeMap<PlayerId, NationSummary>,
    /// Sorted by [`HighScore::rank`], at most `capacity` long.
    high_scores: Vec<HighScore>,
    capacity: usize,
    turn: u32,
}

impl GameState {
    /// Creates an empty game whose high-score table keeps the best
    /// `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            players: BTreeMap::new(),
            summaries: BTreeMap::new(),
            high_scores: Vec::new(),
            capacity,
            turn: 1,
        }
    }

    /// Registers a player. Re-registering replaces the entry.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        nation: impl Into<String>,
    ) -> &mut Self {
        self.players.insert(
            id,
            PlayerEntry {
                name: name.into(),
                nation: nation.into(),
                score: 0,
                retired: false,
            },
        );
        self
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerEntry> {
        self.players.get(&id)
    }

    /// Registered player ids, in id order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    /// `true` if `id` is on the roster and has not retired.
    pub fn is_active_player(&self, id: PlayerId) -> bool {
        self.players.get(&id).is_some_and(|p| !p.retired)
    }

    /// Sets a player's running score. Returns `false` for unknown players.
    pub fn set_score(&mut self, id: PlayerId, score: i32) -> bool {
        match self.players.get_mut(&id) {
            Some(entry) => {
                entry.score = score;
                true
            }
            None => false,
        }
    }

    pub fn set_summary(&mut self, id: PlayerId, summary: NationSummary) {
        self.summaries.insert(id, summary);
    }

    pub fn summary(&self, id: PlayerId) -> Option<&NationSummary> {
        self.summaries.get(&id)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// The high-score table, best first.
    pub fn high_scores(&self) -> &[HighScore] {
        &self.high_scores
    }

    /// Inserts `score` at its ranked position and trims the table.
    ///
    /// Among equal entries the newcomer goes last. Returns the 0-based
    /// rank, or `None` if the score didn't make the table.
    pub fn insert_high_score(&mut self, score: HighScore) -> Option<usize> {
        let rank = self
            .high_scores
            .partition_point(|existing| HighScore::rank(existing, &score).is_le());
        if rank >= self.capacity {
            return None;
        }
        self.high_scores.insert(rank, score);
        self.high_scores.truncate(self.capacity);
        Some(rank)
    }

    /// Marks `id` retired and returns the high-score entry for their
    /// current standing. `None` if the player is unknown or already
    /// retired.
    pub fn retire(&mut self, id: PlayerId) -> Option<HighScore> {
        let turn = self.turn;
        let entry = self.players.get_mut(&id).filter(|p| !p.retired)?;
        entry.retired = true;
        Some(HighScore {
            player_name: entry.name.clone(),
            nation_name: entry.nation.clone(),
            score: entry.score,
            turn,
            retired: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: i32, turn: u32) -> HighScore {
        HighScore {
            player_name: name.into(),
            nation_name: "French".into(),
            score,
            turn,
            retired: false,
        }
    }

    fn names(state: &GameState) -> Vec<&str> {
        state
            .high_scores()
            .iter()
            .map(|s| s.player_name.as_str())
            .collect()
    }

    // =====================================================================
    // High scores
    // =====================================================================

    #[test]
    fn test_insert_high_score_keeps_descending_order() {
        let mut state = GameState::new(10);
        state.insert_high_score(entry("mid", 50, 1));
        state.insert_high_score(entry("top", 90, 1));
        state.insert_high_score(entry("low", 10, 1));

        assert_eq!(names(&state), ["top", "mid", "low"]);
    }

    #[test]
    fn test_insert_high_score_equal_score_earlier_turn_ranks_higher() {
        let mut state = GameState::new(10);
        state.insert_high_score(entry("late", 50, 300));
        let rank = state.insert_high_score(entry("early", 50, 100));

        assert_eq!(rank, Some(0));
        assert_eq!(names(&state), ["early", "late"]);
    }

    #[test]
    fn test_insert_high_score_identical_entry_goes_after_existing() {
        let mut state = GameState::new(10);
        state.insert_high_score(entry("first", 50, 100));
        let rank = state.insert_high_score(entry("second", 50, 100));

        assert_eq!(rank, Some(1));
    }

    #[test]
    fn test_insert_high_score_trims_to_capacity() {
        let mut state = GameState::new(2);
        state.insert_high_score(entry("a", 30, 1));
        state.insert_high_score(entry("b", 20, 1));

        assert_eq!(state.insert_high_score(entry("c", 10, 1)), None);
        assert_eq!(state.insert_high_score(entry("d", 40, 1)), Some(0));
        assert_eq!(names(&state), ["d", "a"]);
    }

    #[test]
    fn test_zero_capacity_table_stays_empty() {
        let mut state = GameState::new(0);
        assert_eq!(state.insert_high_score(entry("a", 1, 1)), None);
        assert!(state.high_scores().is_empty());
    }

    // =====================================================================
    // Roster
    // =====================================================================

    #[test]
    fn test_retire_marks_player_and_reports_current_score() {
        let mut state = GameState::new(10);
        state.add_player(PlayerId(1), "Ana", "Portuguese");
        state.set_score(PlayerId(1), 120);
        state.advance_turn();

        let score = state.retire(PlayerId(1)).expect("active player retires");

        assert_eq!(score.player_name, "Ana");
        assert_eq!(score.score, 120);
        assert_eq!(score.turn, 2);
        assert!(score.retired);
        assert!(!state.is_active_player(PlayerId(1)));
        assert!(state.player(PlayerId(1)).is_some());
    }

    #[test]
    fn test_retire_twice_or_unknown_is_none() {
        let mut state = GameState::new(10);
        state.add_player(PlayerId(1), "Ana", "Portuguese");
        state.retire(PlayerId(1));

        assert_eq!(state.retire(PlayerId(1)), None);
        assert_eq!(state.retire(PlayerId(99)), None);
    }

    #[test]
    fn test_set_score_unknown_player_is_false() {
        let mut state = GameState::new(10);
        assert!(!state.set_score(PlayerId(5), 10));
    }
}
