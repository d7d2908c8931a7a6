//! The shared update queue.
//!
//! A min-heap keyed by due time behind its own lock. Producers block
//! briefly on push, workers only ever try-lock so contention shows up as a
//! failed pop instead of a stalled worker. Updates that are not yet due stay
//! in the heap and are never handed out.

use std::collections::BinaryHeap;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use super::update::{PendingUpdate, QueuedUpdate};

/// Outcome of a non-blocking pop.
#[derive(Debug)]
pub enum Pop {
    /// A due update, now owned by the caller.
    Due(PendingUpdate),
    /// The earliest update is not due yet.
    NotDue,
    /// The queue is empty.
    Empty,
    /// Another thread holds the queue lock.
    Contended,
}

/// Multi-producer, multi-consumer queue of pending updates.
pub struct UpdateQueue {
    heap: Mutex<BinaryHeap<QueuedUpdate>>,
    /// Counter for insertion order.
    sequence: AtomicU64,
}

impl UpdateQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Adds an update.
    pub fn push(&self, update: PendingUpdate) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.heap.lock().push(QueuedUpdate { update, sequence });
    }

    /// Pops the earliest update if it is due at `now`, without blocking.
    pub fn try_pop_due(&self, now: Instant) -> Pop {
        let Some(mut heap) = self.heap.try_lock() else {
            return Pop::Contended;
        };
        let due = match heap.peek() {
            None => return Pop::Empty,
            Some(top) => top.update.due_at <= now,
        };
        if !due {
            return Pop::NotDue;
        }
        heap.pop().map_or(Pop::Empty, |entry| Pop::Due(entry.update))
    }

    /// Number of queued updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }

    /// Removes every queued update and returns them.
    pub fn drain(&self) -> Vec<PendingUpdate> {
        let heap = mem::take(&mut *self.heap.lock());
        heap.into_iter().map(|entry| entry.update).collect()
    }
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}
