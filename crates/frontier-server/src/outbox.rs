//! Per-player outbound queue.
//!
//! Every [`ChangeSet`](frontier_protocol::ChangeSet) the server delivers
//! becomes one batch per recipient. The outbox decides what goes on the
//! wire next:
//!
//! - messages inside one batch leave in batch order, always;
//! - between batches, the one with the higher priority goes first;
//! - batches of equal priority leave first-in, first-out.
//!
//! A batch's priority is the highest priority of any message in it. A
//! higher-priority batch that arrives while a lower one is half sent
//! overtakes the rest of it, which never reorders messages within either
//! batch.
//!
//! The outbox is bounded. A batch that does not fit is never dropped on
//! its own: the [`Outlet`] is marked overflowed and the connection is
//! closed, so the client sees the loss and has to log in again.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, PoisonError};

use frontier_protocol::{AnyMessage, Priority};
use tokio::sync::Notify;

/// The bounded outbound queue of one connection.
#[derive(Debug)]
pub struct Outbox {
    heap: BinaryHeap<Batch>,
    next_seq: u64,
    len: usize,
    capacity: usize,
}

#[derive(Debug)]
struct Batch {
    priority: Priority,
    seq: u64,
    messages: VecDeque<AnyMessage>,
}

// Max-heap order: higher priority first, then lower sequence number.
impl Ord for Batch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Batch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Batch {}

impl Outbox {
    /// Creates an outbox holding at most `capacity` queued messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            len: 0,
            capacity,
        }
    }

    /// Queues one batch.
    ///
    /// Returns `false`, queuing nothing, if the batch would push the outbox
    /// past its capacity. Empty batches are accepted and ignored.
    pub fn push(&mut self, messages: Vec<AnyMessage>) -> bool {
        let Some(priority) = messages.iter().map(AnyMessage::priority).max() else {
            return true;
        };
        if self.len + messages.len() > self.capacity {
            return false;
        }
        self.len += messages.len();
        self.heap.push(Batch {
            priority,
            seq: self.next_seq,
            messages: messages.into(),
        });
        self.next_seq += 1;
        true
    }

    /// Takes the next message to send.
    pub fn pop(&mut self) -> Option<AnyMessage> {
        let mut batch = self.heap.pop()?;
        let message = batch.messages.pop_front();
        if !batch.messages.is_empty() {
            self.heap.push(batch);
        }
        if message.is_some() {
            self.len -= 1;
        }
        message
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ---------------------------------------------------------------------------
// Outlet
// ---------------------------------------------------------------------------

/// An [`Outbox`] shared between the fan-out and one connection's writer
/// task.
#[derive(Debug)]
pub(crate) struct Outlet {
    outbox: Mutex<Outbox>,
    ready: Notify,
    overflowed: AtomicBool,
}

impl Outlet {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            outbox: Mutex::new(Outbox::new(capacity)),
            ready: Notify::new(),
            overflowed: AtomicBool::new(false),
        }
    }

    /// Queues a batch and wakes the writer.
    ///
    /// Returns `false` if the batch did not fit. The outlet is then marked
    /// overflowed and accepts nothing more; the writer closes the
    /// connection once it has sent what is already queued.
    pub(crate) fn push(&self, batch: Vec<AnyMessage>) -> bool {
        if self.is_overflowed() {
            return false;
        }
        let accepted = self
            .outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch);
        if !accepted {
            self.overflowed.store(true, AtomicOrdering::Release);
        }
        self.ready.notify_one();
        accepted
    }

    pub(crate) fn is_overflowed(&self) -> bool {
        self.overflowed.load(AtomicOrdering::Acquire)
    }

    pub(crate) fn pop(&self) -> Option<AnyMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// Waits until something was pushed since the last wake-up.
    pub(crate) async fn ready(&self) {
        self.ready.notified().await;
    }
}
