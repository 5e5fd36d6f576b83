//! Example business services registered on top of the dispatcher.
//!
//! These are the pluggable callback chains the engine is generic over: each
//! service registers an ordered list of handler stages per endpoint and
//! drains its mailbox once per round. Handlers are phase-aware: on
//! `Phase::Rollback` they undo their ledger writes instead of advancing the
//! saga.
//!
//! The demo saga wired here is a payment flow:
//!
//! ```text
//! payment/payment: [call order, commit, call notification, finalize]
//! order/order:     [call shipping, call customer, finalize]
//! shipping, customer, notification: single-stage endpoints
//! ```

mod customer;
mod notification;
mod order;
mod payment;
mod shipping;

pub use customer::CustomerService;
pub use notification::NotificationService;
pub use order::OrderService;
pub use payment::{PaymentRecord, PaymentService};
pub use shipping::ShippingService;
