//! cardledger - funds-movement core for a card banking service
//!
//! Withdrawals and transfers against shared card balances, executed as
//! atomic units with ordered row locking, plus fee revenue reporting.
//!
//! # Modules
//!
//! - [`config`] - YAML application config
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool with explicit lifecycle
//! - [`ledger`] - the funds-movement core (engine, stores, fee policy)

pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use ledger::{Card, FundsEngine, LedgerError, TransactionRecord, TxStatus};
