//! Core types for the saga simulation.
//!
//! Everything here is plain data shared across the workspace: service
//! identifiers, the simulation clock unit ([`Round`]), call/rollback stack
//! frames, the saga lifecycle enums, and the typed event payload.

mod body;
mod identifiers;
mod lifecycle;
mod request;

pub use body::{Body, BodyValue};
pub use identifiers::{Frame, Round, ServiceId, TxId};
pub use lifecycle::{FailureKind, Phase, TxState};
pub use request::Request;
