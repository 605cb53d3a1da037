//! Company treasury: an append-only cash ledger.
//!
//! The cash balance is never stored as a mutable scalar. Flows append
//! signed events (loan disbursement, write-back, interest collection,
//! capital adjustments) and the balance is the fold of initial capital
//! plus all events. Concurrent flows append rows; nothing races on a
//! shared counter.

pub mod error;
pub mod ledger;
pub mod types;

pub use error::TreasuryError;
pub use ledger::CashLedger;
pub use types::{CashEvent, CashEventKind};
