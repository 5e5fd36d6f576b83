//! Round-gated priority queues.
//!
//! Every mailbox in the simulation is a [`RoundQueue`]: a mutex-guarded
//! binary min-heap keyed by round number, gated by a shared [`RoundClock`].
//! An entry scheduled for round R is invisible to `pop`, `len`, and
//! `is_empty` alike until the clock reaches R. This is what enforces
//! causal ordering across the whole engine: nothing can observe a message
//! from the future.

mod clock;
mod round_queue;

pub use clock::{ClockHandle, RoundClock};
pub use round_queue::RoundQueue;

use thiserror::Error;

/// Errors produced by queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Pop on an empty (or gated-empty) queue. Expected; callers check
    /// `is_empty` first or treat this as "drained".
    #[error("empty queue")]
    Empty,
}
