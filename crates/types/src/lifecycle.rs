//! Saga lifecycle enums.
//!
//! `Phase` and `TxState` are orthogonal axes: the phase says where in the
//! saga lifecycle an event sits, the state is an outcome annotation written
//! by handlers and read by the transaction manager.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the saga lifecycle an event sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fresh ingress, not yet acknowledged by the transaction manager.
    #[default]
    Begin,
    /// Forward execution through handler chains.
    Processing,
    /// Compensating unwind after an abort.
    Rollback,
    /// The call stack is exhausted; awaiting terminal bookkeeping.
    End,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Begin => "begin",
            Phase::Processing => "processing",
            Phase::Rollback => "rollback",
            Phase::End => "end",
        };
        f.write_str(s)
    }
}

/// Transaction outcome annotation.
///
/// Used both on events (set by handlers) and in the transaction manager's
/// progress table (one entry per transaction).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
    /// No outcome recorded yet.
    #[default]
    None,
    /// The transaction manager has acknowledged the transaction.
    InProgress,
    /// A handler voted to commit.
    Commit,
    /// The transaction must unwind.
    Abort,
    /// Terminal; no further scheduling.
    Complete,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxState::None => "none",
            TxState::InProgress => "in_progress",
            TxState::Commit => "commit",
            TxState::Abort => "abort",
            TxState::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Kind of injected failure a service can suffer during an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service process is down.
    Crash,
    /// The service is up but unreachable.
    LinkBroken,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Crash => "crash",
            FailureKind::LinkBroken => "link_broken",
        };
        f.write_str(s)
    }
}
