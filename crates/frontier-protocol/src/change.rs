//! Change sets: what a server-side handler asks the server to send.
//!
//! A handler never touches a connection. It describes the outcome as a
//! [`ChangeSet`], an ordered list of (audience, message) pairs, and the
//! server's fan-out delivers it. Two changes that reach the same player
//! arrive in the order they were added.

use crate::{AnyMessage, Audience, ErrorMessage, HandlerError, PlayerId};

/// One message addressed to one audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub audience: Audience,
    pub message: AnyMessage,
}

/// An ordered collection of [`Change`]s. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A change set with a single message for a single player.
    pub fn only(player: PlayerId, message: impl Into<AnyMessage>) -> Self {
        Self::new().with(Audience::Player(player), message)
    }

    /// The change set a refused request produces: one error notice for the
    /// sender, keyed by the kind of failure.
    pub fn refusal(sender: PlayerId, error: &HandlerError) -> Self {
        Self::only(
            sender,
            ErrorMessage::new(error.notice_key(), error.to_string()),
        )
    }

    /// Appends a change.
    pub fn add(&mut self, audience: Audience, message: impl Into<AnyMessage>) -> &mut Self {
        self.changes.push(Change {
            audience,
            message: message.into(),
        });
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, audience: Audience, message: impl Into<AnyMessage>) -> Self {
        self.add(audience, message);
        self
    }

    /// Appends every change of `other`, after the ones already here.
    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// The messages `player` must receive, in order.
    pub fn deliveries_for(&self, player: PlayerId) -> impl Iterator<Item = &AnyMessage> {
        self.changes
            .iter()
            .filter(move |c| c.audience.includes(player))
            .map(|c| &c.message)
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
