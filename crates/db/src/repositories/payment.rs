//! Payment repository: the atomic settlement operation.
//!
//! Recording a payment, decrementing the loan's remaining balance,
//! advancing its next due date, flipping its status, and crediting the
//! interest to the treasury is ONE database transaction with an
//! exclusive row lock on the loan. Two concurrent submissions for the
//! same loan serialize on the lock; the second observes the updated row
//! and fails the settlement guard instead of double-advancing the
//! schedule.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use tracing::debug;

use prestar_core::loan::{self, plan_settlement};
use prestar_core::treasury::CashEvent;

use crate::entities::{loans, payments, sea_orm_active_enums::PaymentStatus};

use super::loan::{insert_cash_event, loan_snapshot};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    /// The settlement rules refused the payment.
    #[error(transparent)]
    Settlement(#[from] loan::LoanError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for processing a payment.
#[derive(Debug, Clone)]
pub struct ProcessPaymentInput {
    /// Amount paid.
    pub amount: Decimal,
    /// Date the payment was received.
    pub paid_on: NaiveDate,
}

/// Result of a processed payment: the settled installment and the
/// updated loan.
#[derive(Debug, Clone)]
pub struct ProcessedPayment {
    /// The inserted payment row.
    pub payment: payments::Model,
    /// The loan after the settlement.
    pub loan: loans::Model,
}

/// Payment repository for settlement and history.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Settles the next installment of a loan.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::LoanNotFound` if the loan is missing,
    /// `PaymentError::Settlement` if the settlement rules refuse the
    /// payment (already paid, non-positive amount), or a database error.
    /// On any error the transaction rolls back; no partial state change
    /// occurs.
    pub async fn process_payment(
        &self,
        owner_id: Uuid,
        loan_id: Uuid,
        input: ProcessPaymentInput,
    ) -> Result<ProcessedPayment, PaymentError> {
        let txn = self.db.begin().await?;

        // Serialize concurrent settlements on the loan row.
        let loan = loans::Entity::find_by_id(loan_id)
            .filter(loans::Column::OwnerId.eq(owner_id))
            .filter(loans::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PaymentError::LoanNotFound(loan_id))?;

        let paid_count = payments::Entity::find()
            .filter(payments::Column::LoanId.eq(loan_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Paid))
            .count(&txn)
            .await?;

        #[allow(clippy::cast_possible_truncation)]
        let outcome = plan_settlement(&loan_snapshot(&loan), paid_count as u32, input.amount)?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            loan_id: Set(loan_id),
            amount: Set(input.amount),
            paid_on: Set(input.paid_on),
            installment_number: Set(i32::try_from(outcome.installment_number).unwrap_or(i32::MAX)),
            status: Set(PaymentStatus::Paid),
            created_at: Set(now),
        };
        let payment = payment.insert(&txn).await?;

        let mut active: loans::ActiveModel = loan.into();
        active.remaining_balance = Set(outcome.new_remaining);
        active.next_payment_date = Set(outcome.next_payment_date);
        active.status = Set(outcome.new_status.into());
        active.updated_at = Set(now);
        let loan = active.update(&txn).await?;

        if outcome.interest_portion > Decimal::ZERO {
            let event = CashEvent::interest_collected(outcome.interest_portion, input.paid_on);
            insert_cash_event(&txn, owner_id, Some(loan_id), &event).await?;
        }

        txn.commit().await?;
        debug!(
            loan_id = %loan.id,
            installment = payment.installment_number,
            remaining = %loan.remaining_balance,
            "Installment settled"
        );
        Ok(ProcessedPayment { payment, loan })
    }

    /// Lists a loan's recorded payments in installment order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_payments(
        &self,
        owner_id: Uuid,
        loan_id: Uuid,
    ) -> Result<Vec<payments::Model>, PaymentError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::OwnerId.eq(owner_id))
            .filter(payments::Column::LoanId.eq(loan_id))
            .order_by_asc(payments::Column::InstallmentNumber)
            .all(&self.db)
            .await?)
    }
}
