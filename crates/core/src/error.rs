//! Error taxonomy for the saga engine.
//!
//! None of these are fatal to a simulation: routing inconsistencies are
//! logged and the offending event dropped; the round driver always
//! completes its pass.

use sagasim_types::TxId;
use thiserror::Error;

/// Errors surfaced by dispatch, routing, and handler execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SagaError {
    /// No handler chain is registered under this endpoint name.
    #[error("no handler chain for endpoint `{0}`")]
    WrongEndpoint(String),

    /// Stage index outside the registered chain.
    #[error("stage {stage} out of range for endpoint `{endpoint}`")]
    WrongStage { endpoint: String, stage: usize },

    /// Event reached a service that cannot interpret its shape.
    ///
    /// Reserved: the typed mailboxes make this unrepresentable in the
    /// current wiring, but custom ingress paths may still need it.
    #[error("wrong message type")]
    WrongMessageType,

    /// Retry budget exhausted; terminal for the event.
    #[error("too many retries for {0}")]
    TooManyRetries(TxId),

    /// Call or rollback stack exhausted where a frame was required.
    #[error("no more service on the stack")]
    NoMoreService,

    /// A handler required a payload field that is absent or mistyped.
    #[error("missing body field `{0}`")]
    MissingField(&'static str),
}
