//! Settlement computation and lifecycle guards.
//!
//! Pure functions: the persistence layer fetches the loan under an
//! exclusive row lock, calls into here, and applies the outcome in the
//! same database transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::LoanError;
use super::types::{LoanSnapshot, LoanStatus, SettlementOutcome};
use crate::amortization::{advance_months, is_settled};

/// Recomputes the display status of a loan from dates and balance.
///
/// The stored status is authoritative for billing and is only mutated
/// by the settlement transaction (or an explicit overdue sweep). This
/// derived value is what the UI shows for urgency highlighting: a loan
/// whose balance is under the settled tolerance reads as `Paid`, one
/// whose next due date has passed reads as `Overdue`, everything else
/// keeps its stored status.
#[must_use]
pub fn derived_status(loan: &LoanSnapshot, today: NaiveDate) -> LoanStatus {
    if loan.status == LoanStatus::Paid || is_settled(loan.remaining_balance) {
        return LoanStatus::Paid;
    }
    if loan.next_payment_date < today {
        return LoanStatus::Overdue;
    }
    loan.status
}

/// Computes the state changes of settling the next installment.
///
/// `count_paid` is the number of paid payments already recorded for the
/// loan. The returned outcome decrements the remaining balance, advances
/// the next due date by one calendar month, and flips the status to
/// `Paid` when this payment is the last installment or brings the
/// balance under the settled tolerance.
///
/// # Errors
///
/// - [`LoanError::AlreadySettled`] if the loan is already paid (by
///   stored status or because `count_paid` reached the installment
///   count).
/// - [`LoanError::NonPositiveAmount`] if `amount <= 0`.
/// - [`LoanError::NoInstallments`] if the loan has a zero installment
///   count.
pub fn plan_settlement(
    loan: &LoanSnapshot,
    count_paid: u32,
    amount: Decimal,
) -> Result<SettlementOutcome, LoanError> {
    if loan.installments == 0 {
        return Err(LoanError::NoInstallments);
    }
    if !loan.status.is_open() || count_paid >= loan.installments {
        return Err(LoanError::AlreadySettled);
    }
    if amount <= Decimal::ZERO {
        return Err(LoanError::NonPositiveAmount);
    }

    let outstanding = loan.remaining_balance - amount;
    let new_remaining = if outstanding < Decimal::ZERO || is_settled(outstanding) {
        Decimal::ZERO
    } else {
        outstanding
    };

    let paid_after = count_paid + 1;
    let new_status = if paid_after >= loan.installments || is_settled(new_remaining) {
        LoanStatus::Paid
    } else {
        LoanStatus::Active
    };

    // Interest share of one installment: whatever exceeds the even
    // principal split.
    let principal_share = loan.principal / Decimal::from(loan.installments);
    let interest_portion = (amount - principal_share).max(Decimal::ZERO);

    Ok(SettlementOutcome {
        installment_number: paid_after,
        new_remaining,
        next_payment_date: advance_months(loan.next_payment_date, 1),
        new_status,
        interest_portion,
    })
}

/// Checks whether a loan may be soft-deleted.
///
/// A loan with any paid payment is immutable: the payment history is an
/// audit trail.
///
/// # Errors
///
/// Returns [`LoanError::HasPaidPayments`] when deletion must be refused.
pub fn can_delete_loan(paid_payments: u32) -> Result<(), LoanError> {
    if paid_payments > 0 {
        return Err(LoanError::HasPaidPayments(paid_payments));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open_loan() -> LoanSnapshot {
        LoanSnapshot {
            status: LoanStatus::Active,
            principal: dec!(1200),
            installments: 12,
            installment_value: dec!(110),
            remaining_balance: dec!(1320),
            next_payment_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        }
    }

    #[test]
    fn test_settlement_advances_one_month() {
        let outcome = plan_settlement(&open_loan(), 0, dec!(110)).unwrap();
        assert_eq!(
            outcome.next_payment_date,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
        assert_eq!(outcome.installment_number, 1);
        assert_eq!(outcome.new_remaining, dec!(1210));
        assert_eq!(outcome.new_status, LoanStatus::Active);
        assert!(!outcome.settles_loan());
    }

    #[test]
    fn test_last_installment_settles_loan() {
        let mut loan = open_loan();
        loan.remaining_balance = dec!(110);
        let outcome = plan_settlement(&loan, 11, dec!(110)).unwrap();
        assert_eq!(outcome.new_status, LoanStatus::Paid);
        assert_eq!(outcome.new_remaining, Decimal::ZERO);
        assert!(outcome.settles_loan());
    }

    #[test]
    fn test_sub_cent_residue_counts_as_settled() {
        let mut loan = open_loan();
        loan.remaining_balance = dec!(110.004);
        let outcome = plan_settlement(&loan, 5, dec!(110)).unwrap();
        assert_eq!(outcome.new_remaining, Decimal::ZERO);
        assert_eq!(outcome.new_status, LoanStatus::Paid);
    }

    #[test]
    fn test_interest_portion_is_excess_over_principal_share() {
        let outcome = plan_settlement(&open_loan(), 0, dec!(110)).unwrap();
        // principal share = 1200 / 12 = 100
        assert_eq!(outcome.interest_portion, dec!(10));
    }

    #[test]
    fn test_settled_loan_rejects_payment() {
        let mut loan = open_loan();
        loan.status = LoanStatus::Paid;
        assert_eq!(
            plan_settlement(&loan, 12, dec!(110)),
            Err(LoanError::AlreadySettled)
        );
    }

    #[test]
    fn test_count_paid_at_limit_rejects_payment() {
        // Stored status lagging behind the payment history still refuses.
        let loan = open_loan();
        assert_eq!(
            plan_settlement(&loan, 12, dec!(110)),
            Err(LoanError::AlreadySettled)
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert_eq!(
            plan_settlement(&open_loan(), 0, dec!(0)),
            Err(LoanError::NonPositiveAmount)
        );
        assert_eq!(
            plan_settlement(&open_loan(), 0, dec!(-5)),
            Err(LoanError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_derived_status_overdue() {
        let loan = open_loan();
        let after_due = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        assert_eq!(derived_status(&loan, after_due), LoanStatus::Overdue);
    }

    #[test]
    fn test_derived_status_on_due_date_is_active() {
        let loan = open_loan();
        let on_due = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert_eq!(derived_status(&loan, on_due), LoanStatus::Active);
    }

    #[test]
    fn test_derived_status_settled_balance_reads_paid() {
        let mut loan = open_loan();
        loan.remaining_balance = dec!(0.005);
        let after_due = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(derived_status(&loan, after_due), LoanStatus::Paid);
    }

    #[test]
    fn test_can_delete_loan_guard() {
        assert!(can_delete_loan(0).is_ok());
        assert_eq!(can_delete_loan(3), Err(LoanError::HasPaidPayments(3)));
    }
}
