//! Funds-movement core
//!
//! The subsystem that moves money between card rows under exclusive locks:
//!
//! - [`models`] - Typed card and transaction rows
//! - [`error`] - Caller-facing error taxonomy
//! - [`fee`] - Fee policy and business limits
//! - [`card_store`] - Card row access, locking, balance adjustment
//! - [`tx_store`] - Append-only transaction records and aggregates
//! - [`engine`] - Withdraw/transfer pipelines and the revenue query
//! - [`schema`] - DDL bootstrap for tests and fresh databases

pub mod card_store;
pub mod engine;
pub mod error;
pub mod fee;
pub mod models;
pub mod schema;
pub mod tx_store;

#[cfg(test)]
mod integration_tests;

pub use card_store::CardStore;
pub use engine::FundsEngine;
pub use error::LedgerError;
pub use fee::calc_fee;
pub use models::{Card, TransactionActivity, TransactionRecord, TxStatus};
pub use tx_store::TxStore;
