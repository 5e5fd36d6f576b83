//! Saga coordination: the per-transaction state machine and the ingress
//! gateway.

mod gateway;
mod tx_manager;

pub use gateway::RoundGateway;
pub use tx_manager::TxManager;
