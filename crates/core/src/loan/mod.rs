//! Loan status state machine and settlement rules.

pub mod error;
pub mod service;
pub mod types;

pub use error::LoanError;
pub use service::{can_delete_loan, derived_status, plan_settlement};
pub use types::{LoanSnapshot, LoanStatus, SettlementOutcome};
