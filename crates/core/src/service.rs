//! The capability interface every simulated service implements.

use sagasim_types::ServiceId;

/// A participant in the round loop.
///
/// `receive` is one round's worth of work: drain the service's mailbox to
/// empty and process each event. It must return once the mailbox reports
/// empty so the round barrier always completes; it must never sleep or
/// block on anything other than the short queue/table locks.
pub trait Service: Send + Sync {
    /// Which service this is.
    fn id(&self) -> ServiceId;

    /// Drain and process everything due this round.
    fn receive(&self);
}
