//! Loan rule errors.

use thiserror::Error;

/// Violations of the loan business rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoanError {
    /// Payments cannot be recorded against a settled loan.
    #[error("loan is already fully paid")]
    AlreadySettled,

    /// Payment amounts must be positive.
    #[error("payment amount must be positive")]
    NonPositiveAmount,

    /// A loan with paid history is immutable (audit trail).
    #[error("loan has {0} paid payment(s) and cannot be deleted")]
    HasPaidPayments(u32),

    /// Loan terms must produce at least one installment.
    #[error("loan has no installments")]
    NoInstallments,
}
