//! Loan domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Loan lifecycle status.
///
/// `Active` is the initial state. `Overdue` is reached when a due date
/// passes without a recorded payment; `Paid` when the final installment
/// settles. `Paid` is terminal: the only operation left is a guarded
/// soft-delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// The loan is being repaid on schedule.
    Active,
    /// At least one installment is past due.
    Overdue,
    /// All installments are settled.
    Paid,
}

impl LoanStatus {
    /// Returns true if the loan still accepts payments
    /// (`Active` or `Overdue`).
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::Overdue)
    }

    /// Returns true if the loan is in its terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// The slice of loan state the engine and settlement rules read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSnapshot {
    /// Stored status (authoritative for billing).
    pub status: LoanStatus,
    /// Principal amount lent.
    pub principal: Decimal,
    /// Number of installments.
    pub installments: u32,
    /// Fixed value of each installment.
    pub installment_value: Decimal,
    /// Balance still owed.
    pub remaining_balance: Decimal,
    /// Date the next installment falls due.
    pub next_payment_date: NaiveDate,
}

/// The state changes one settlement applies to a loan.
///
/// Produced by [`plan_settlement`](crate::loan::plan_settlement) and
/// applied atomically (payment insert + loan update + treasury event)
/// by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// 1-based number of the installment being settled.
    pub installment_number: u32,
    /// Balance owed after the payment, clamped at zero.
    pub new_remaining: Decimal,
    /// Next due date, one calendar month after the previous one.
    pub next_payment_date: NaiveDate,
    /// Status after the payment (`Paid` when this was the last
    /// installment or the balance fell under the settled tolerance).
    pub new_status: LoanStatus,
    /// Interest portion of the payment, credited to the treasury.
    pub interest_portion: Decimal,
}

impl SettlementOutcome {
    /// Returns true if this settlement closes the loan.
    #[must_use]
    pub fn settles_loan(&self) -> bool {
        self.new_status == LoanStatus::Paid
    }
}
