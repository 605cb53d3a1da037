//! Treasury rule errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Violations of the treasury rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreasuryError {
    /// A disbursement may not exceed the available balance.
    #[error("insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds {
        /// Balance currently available.
        available: Decimal,
        /// Amount the operation needed.
        requested: Decimal,
    },

    /// Monetary movements must be non-zero.
    #[error("cash movement amount must be non-zero")]
    ZeroAmount,
}
