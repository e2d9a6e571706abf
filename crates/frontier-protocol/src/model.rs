//! Domain records carried inside messages.
//!
//! The game rules behind these values (how a score is computed, what makes
//! two nations allies) live elsewhere. Here they are plain data with a
//! record schema, so they can ride inside messages as child records.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{Attributes, Fields, NoChildren, ProtocolError, Record};

// ---------------------------------------------------------------------------
// HighScore
// ---------------------------------------------------------------------------

/// One entry of the high-score table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    /// Name of the player who earned the score.
    pub player_name: String,
    /// The nation they played.
    pub nation_name: String,
    /// The final score. Can be negative for disastrous games.
    pub score: i32,
    /// The turn on which the game ended for this player.
    pub turn: u32,
    /// Whether the player retired rather than winning or losing.
    pub retired: bool,
}

impl HighScore {
    /// Ranking order for a leaderboard: higher scores first; on equal
    /// scores, the earlier finish wins.
    pub fn rank(a: &HighScore, b: &HighScore) -> Ordering {
        b.score.cmp(&a.score).then(a.turn.cmp(&b.turn))
    }
}

impl Record for HighScore {
    const TAG: &'static str = "score";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("playerName", self.player_name.as_str())
            .with("nationName", self.nation_name.as_str())
            .with("score", self.score.to_string())
            .with("turn", self.turn.to_string())
            .with("retired", self.retired.to_string())
    }

    fn from_parts(fields: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
        Ok(Self {
            player_name: fields.required_string("playerName")?,
            nation_name: fields.string("nationName"),
            score: fields.required("score")?,
            turn: fields.number("turn")?,
            retired: fields.flag("retired")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Stance
// ---------------------------------------------------------------------------

/// Diplomatic stance of one nation towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stance {
    /// Never met, or not visible to the asker.
    #[default]
    Unknown,
    Peace,
    CeaseFire,
    War,
    Alliance,
}

impl Stance {
    /// The message key for the stance label.
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Unknown => "model.stance.unknown",
            Self::Peace => "model.stance.peace",
            Self::CeaseFire => "model.stance.ceaseFire",
            Self::War => "model.stance.war",
            Self::Alliance => "model.stance.alliance",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unknown => "unknown",
            Self::Peace => "peace",
            Self::CeaseFire => "ceaseFire",
            Self::War => "war",
            Self::Alliance => "alliance",
        };
        f.write_str(text)
    }
}

impl FromStr for Stance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "peace" => Ok(Self::Peace),
            "ceaseFire" => Ok(Self::CeaseFire),
            "war" => Ok(Self::War),
            "alliance" => Ok(Self::Alliance),
            other => Err(format!("unknown stance `{other}`")),
        }
    }
}

// ---------------------------------------------------------------------------
// NationSummary
// ---------------------------------------------------------------------------

/// A snapshot of a foreign nation, as seen by the player asking.
///
/// `founding_fathers`, `tax` and `sons_of_liberty` use a negative value to
/// mean "unknown or not applicable" (natives have no congress, for
/// example). Use the accessor methods to get them as `Option`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationSummary {
    pub stance: Stance,
    pub number_of_settlements: u32,
    pub number_of_units: u32,
    pub military_strength: i32,
    pub naval_strength: i32,
    pub gold: i32,
    pub founding_fathers: i32,
    pub tax: i32,
    pub sons_of_liberty: i32,
}

impl NationSummary {
    /// Sentinel for values the asker may not see.
    pub const UNKNOWN: i32 = -1;

    /// Number of founding fathers in congress, if known.
    pub fn founding_fathers(&self) -> Option<u32> {
        known(self.founding_fathers)
    }

    /// Tax rate in percent, if known.
    pub fn tax(&self) -> Option<u32> {
        known(self.tax)
    }

    /// Rebel (liberty) percentage, if known.
    pub fn sons_of_liberty(&self) -> Option<u32> {
        known(self.sons_of_liberty)
    }
}

fn known(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}

impl Default for NationSummary {
    fn default() -> Self {
        Self {
            stance: Stance::Unknown,
            number_of_settlements: 0,
            number_of_units: 0,
            military_strength: 0,
            naval_strength: 0,
            gold: 0,
            founding_fathers: Self::UNKNOWN,
            tax: Self::UNKNOWN,
            sons_of_liberty: Self::UNKNOWN,
        }
    }
}

impl Record for NationSummary {
    const TAG: &'static str = "summary";
    type Child = NoChildren;

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("stance", self.stance.to_string())
            .with("numberOfSettlements", self.number_of_settlements.to_string())
            .with("numberOfUnits", self.number_of_units.to_string())
            .with("militaryStrength", self.military_strength.to_string())
            .with("navalStrength", self.naval_strength.to_string())
            .with("gold", self.gold.to_string())
            .with("foundingFathers", self.founding_fathers.to_string())
            .with("tax", self.tax.to_string())
            .with("sol", self.sons_of_liberty.to_string())
    }

    fn from_parts(fields: Fields<'_>, _: Vec<NoChildren>) -> Result<Self, ProtocolError> {
        // Absent sentinel fields stay unknown rather than defaulting to 0.
        let sentinel = |name: &str| -> Result<i32, ProtocolError> {
            Ok(fields.optional(name)?.unwrap_or(Self::UNKNOWN))
        };
        Ok(Self {
            stance: fields.number("stance")?,
            number_of_settlements: fields.number("numberOfSettlements")?,
            number_of_units: fields.number("numberOfUnits")?,
            military_strength: fields.number("militaryStrength")?,
            naval_strength: fields.number("navalStrength")?,
            gold: fields.number("gold")?,
            founding_fathers: sentinel("foundingFathers")?,
            tax: sentinel("tax")?,
            sons_of_liberty: sentinel("sol")?,
        })
    }
}
