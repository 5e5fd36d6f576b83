//! The round-gated, thread-safe priority queue.

use crate::{ClockHandle, QueueError};
use parking_lot::Mutex;
use sagasim_types::Round;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

// Queues get a creation-ordered id so `move_to` can take both locks in a
// fixed global order.
static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(0);

struct Entry<T> {
    round: u64,
    seq: u64,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.round == other.round && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the std max-heap pops the lowest round first. Ties break
    // by insertion sequence, though callers must not rely on that.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .round
            .cmp(&self.round)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A mutex-guarded binary min-heap keyed by round, gated by the shared
/// clock: entries whose round exceeds the current round are not observable.
///
/// All public operations acquire the lock for their full extent; no
/// operation is ever visible as partially applied to a concurrent caller.
pub struct RoundQueue<T> {
    id: u64,
    clock: ClockHandle,
    seq: AtomicU64,
    inner: Mutex<BinaryHeap<Entry<T>>>,
}

impl<T> RoundQueue<T> {
    /// Create an empty queue gated by the given clock.
    pub fn new(clock: ClockHandle) -> Self {
        Self {
            id: NEXT_QUEUE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            clock,
            seq: AtomicU64::new(0),
            inner: Mutex::new(BinaryHeap::new()),
        }
    }

    /// Enqueue a value for delivery no earlier than `round`.
    pub fn push(&self, round: Round, value: T) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.inner.lock().push(Entry {
            round: round.get(),
            seq,
            value,
        });
    }

    /// Dequeue the eligible entry with the lowest round.
    ///
    /// Fails with [`QueueError::Empty`] when the queue is empty or every
    /// entry is still gated behind a future round.
    pub fn pop(&self) -> Result<T, QueueError> {
        let now = self.clock.now().get();
        let mut heap = self.inner.lock();
        match heap.peek() {
            Some(entry) if entry.round <= now => {}
            _ => return Err(QueueError::Empty),
        }
        heap.pop().map(|entry| entry.value).ok_or(QueueError::Empty)
    }

    /// Number of entries visible at the current round.
    pub fn len(&self) -> usize {
        let now = self.clock.now().get();
        let heap = self.inner.lock();
        heap.iter().filter(|entry| entry.round <= now).count()
    }

    /// Whether no entry is visible at the current round.
    pub fn is_empty(&self) -> bool {
        let now = self.clock.now().get();
        let heap = self.inner.lock();
        match heap.peek() {
            Some(entry) => entry.round > now,
            None => true,
        }
    }

    /// Atomically transfer this queue's entire contents (gated entries
    /// included) into `dest`, leaving this queue empty. `dest` keeps its
    /// prior contents.
    ///
    /// Both locks are taken in creation order so two queues being swapped
    /// concurrently cannot deadlock.
    pub fn move_to(&self, dest: &Self) {
        // self-transfer would take the same lock twice
        if self.id == dest.id {
            return;
        }
        let (mut src, mut dst) = if self.id < dest.id {
            let src = self.inner.lock();
            let dst = dest.inner.lock();
            (src, dst)
        } else {
            let dst = dest.inner.lock();
            let src = self.inner.lock();
            (src, dst)
        };
        dst.extend(src.drain());
    }
}
