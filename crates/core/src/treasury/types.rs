//! Treasury event types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a cash event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashEventKind {
    /// Manual correction of the available capital (either sign).
    CapitalAdjustment,
    /// Principal handed out when a loan is created (negative).
    LoanDisbursed,
    /// Principal returned when an unpaid loan is deleted (positive).
    LoanWrittenBack,
    /// Interest portion of a settled installment (positive).
    InterestCollected,
}

/// One append-only cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEvent {
    /// What this movement records.
    pub kind: CashEventKind,
    /// Signed amount: negative debits the treasury, positive credits it.
    pub amount: Decimal,
    /// Business date of the movement.
    pub occurred_on: NaiveDate,
}

impl CashEvent {
    /// A disbursement event debiting the principal.
    #[must_use]
    pub fn disbursement(principal: Decimal, occurred_on: NaiveDate) -> Self {
        Self {
            kind: CashEventKind::LoanDisbursed,
            amount: -principal,
            occurred_on,
        }
    }

    /// A write-back event crediting the principal of a deleted loan.
    #[must_use]
    pub fn write_back(principal: Decimal, occurred_on: NaiveDate) -> Self {
        Self {
            kind: CashEventKind::LoanWrittenBack,
            amount: principal,
            occurred_on,
        }
    }

    /// An interest-collection event crediting a settled installment's
    /// interest portion.
    #[must_use]
    pub fn interest_collected(interest: Decimal, occurred_on: NaiveDate) -> Self {
        Self {
            kind: CashEventKind::InterestCollected,
            amount: interest,
            occurred_on,
        }
    }

    /// A signed manual capital adjustment.
    #[must_use]
    pub fn capital_adjustment(amount: Decimal, occurred_on: NaiveDate) -> Self {
        Self {
            kind: CashEventKind::CapitalAdjustment,
            amount,
            occurred_on,
        }
    }
}
