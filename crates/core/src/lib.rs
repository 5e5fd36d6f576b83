//! Core saga engine: the event envelope, the stage-chain dispatcher, the
//! per-service mailbox system, and the shared [`System`] wiring.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         System                           │
//! │   RoundClock ── ClockHandle ──┐                          │
//! │                               ▼                          │
//! │  ┌───────────────────────────────────────────────────┐   │
//! │  │ EventQueue: one RoundQueue<Event> per service     │   │
//! │  └───────────────┬───────────────────▲───────────────┘   │
//! │                  │ pull              │ send              │
//! │                  ▼                   │                   │
//! │  ┌───────────────────────────────────┴───────────────┐   │
//! │  │ per-service EventDispatcher: endpoint → stages    │   │
//! │  └───────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Control flow across services is emulated with two per-event stacks: the
//! call stack (synchronous call/return) and the rollback stack (reverse-
//! order compensation). The dispatcher maintains both; no service ever
//! recurses into another.

mod dispatcher;
mod error;
mod event;
mod mailbox;
mod report;
mod service;
mod system;

pub use dispatcher::{EventDispatcher, EventFn, HandlerChain};
pub use error::SagaError;
pub use event::{next_retry_round, Event, DEFAULT_RETRY_BUDGET};
pub use mailbox::EventQueue;
pub use report::{Report, ReportLine, ReportSink, TraceSink};
pub use service::Service;
pub use system::System;
