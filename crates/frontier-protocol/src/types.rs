//! Small value types shared by every layer: who a message is from, who it
//! is for, and how urgently it should be sent.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A unique identifier for a player (or a spectator) on the server.
///
/// Newtype over `u64` so a player id can't be confused with a turn number
/// or a score. On the wire it is written as the bare number; in logs it
/// prints as `P-42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Parses the attribute form (the bare number).
impl FromStr for PlayerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl PlayerId {
    /// The value written into an XML attribute.
    pub fn to_attribute(self) -> String {
        self.0.to_string()
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// How urgently the transport should send a message.
///
/// Ranked low → high, so `Priority::Urgent > Priority::Trivial`. Priority
/// only decides send order when several messages are queued for the same
/// connection; it never decides whether a message is sent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Informational; fine to send after everything else.
    Trivial,
    /// Ordinary game traffic.
    #[default]
    Normal,
    /// Errors and anything the player must see immediately.
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trivial => write!(f, "trivial"),
            Self::Normal => write!(f, "normal"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

/// Who should receive one entry of a [`ChangeSet`](crate::ChangeSet).
///
/// Audiences are resolved by the server against the players that are
/// connected at fan-out time; nobody is queued for players who are offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// One specific player.
    Player(PlayerId),

    /// Every connected player, spectators included.
    All,

    /// Everyone except the given player.
    AllExcept(PlayerId),

    /// An explicit set of players, e.g. those who can observe some event.
    Subset(Vec<PlayerId>),
}

impl Audience {
    /// Returns `true` if `player` is part of this audience.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::Player(p) => *p == player,
            Self::All => true,
            Self::AllExcept(p) => *p != player,
            Self::Subset(players) => players.contains(&player),
        }
    }
}
