//! Loan repository for loan lifecycle operations.
//!
//! Loan creation and deletion are multi-row writes (loan + treasury
//! event) and run inside a single database transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use prestar_core::amortization::{Quote, RatePeriod, advance_days, advance_months, compute_installment};
use prestar_core::loan::{LoanSnapshot, can_delete_loan, derived_status};
use prestar_core::treasury::{CashEvent, CashLedger, TreasuryError};

use crate::entities::{
    cash_events, clients, company_settings, loans, payments,
    sea_orm_active_enums::{self, LoanStatus, PaymentStatus},
};

/// Error types for loan operations.
#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    NotFound(Uuid),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Company settings missing for this owner.
    #[error("Company settings not configured")]
    CompanyNotConfigured,

    /// The loan terms do not produce a valid quote.
    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    /// The treasury balance does not cover the principal.
    #[error("Insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds {
        /// Balance currently available.
        available: Decimal,
        /// Principal requested.
        requested: Decimal,
    },

    /// A loan with paid history is immutable.
    #[error("Loan has {0} paid payment(s) and cannot be deleted")]
    HasPaidPayments(u32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a loan.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// Owning user.
    pub owner_id: Uuid,
    /// Borrower the loan belongs to.
    pub client_id: Uuid,
    /// Principal amount lent.
    pub principal: Decimal,
    /// Interest rate percentage.
    pub rate_percent: Decimal,
    /// How the rate applies over time.
    pub rate_period: RatePeriod,
    /// Number of installments; ignored for daily terms.
    pub installments: u32,
    /// Days the flat daily rate applies over; only read for daily terms.
    pub days: u32,
    /// Date the loan starts.
    pub start_date: NaiveDate,
}

/// Filter options for listing loans.
#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    /// Filter by borrower.
    pub client_id: Option<Uuid>,
    /// Filter by stored status.
    pub status: Option<LoanStatus>,
}

/// Maps a loan row to the snapshot the domain rules read.
#[must_use]
pub fn loan_snapshot(model: &loans::Model) -> LoanSnapshot {
    LoanSnapshot {
        status: model.status.into(),
        principal: model.principal,
        installments: u32::try_from(model.installments).unwrap_or(0),
        installment_value: model.installment_value,
        remaining_balance: model.remaining_balance,
        next_payment_date: model.next_payment_date,
    }
}

/// Recomputes the display status of a loan row for today.
#[must_use]
pub fn display_status(model: &loans::Model, today: NaiveDate) -> sea_orm_active_enums::LoanStatus {
    derived_status(&loan_snapshot(model), today).into()
}

/// Loan repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a loan and disburses its principal from the treasury.
    ///
    /// The quote is computed server-side from the terms; the insert and
    /// the `loan_disbursed` cash event commit in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the client or company settings are missing,
    /// the terms are degenerate, the treasury balance cannot cover the
    /// principal, or a database operation fails.
    pub async fn create_loan(&self, input: CreateLoanInput) -> Result<loans::Model, LoanError> {
        // Validate the borrower.
        clients::Entity::find_by_id(input.client_id)
            .filter(clients::Column::OwnerId.eq(input.owner_id))
            .filter(clients::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(LoanError::ClientNotFound(input.client_id))?;

        let quote = compute_installment(
            input.principal,
            input.rate_percent,
            input.rate_period,
            input.installments,
            input.days,
        );
        if quote.total_amount() <= Decimal::ZERO {
            return Err(LoanError::InvalidTerms(
                "principal, rate, and term must be positive".to_string(),
            ));
        }

        // One installment of the payoff amount for balloon terms.
        let (installments, installment_value, next_payment_date) = match quote {
            Quote::Recurring {
                installment_value, ..
            } => (
                input.installments,
                installment_value,
                advance_months(input.start_date, 1),
            ),
            Quote::Balloon { total_amount, .. } => {
                (1, total_amount, advance_days(input.start_date, input.days))
            }
        };

        let txn = self.db.begin().await?;

        let ledger = self.load_ledger(&txn, input.owner_id).await?;
        ledger
            .ensure_can_disburse(input.principal)
            .map_err(|e| match e {
                TreasuryError::InsufficientFunds {
                    available,
                    requested,
                } => LoanError::InsufficientFunds {
                    available,
                    requested,
                },
                TreasuryError::ZeroAmount => {
                    LoanError::InvalidTerms("principal must be non-zero".to_string())
                }
            })?;

        let now = Utc::now().into();
        let loan_id = Uuid::now_v7();
        let installment_count = i32::try_from(installments).unwrap_or(i32::MAX);

        let loan = loans::ActiveModel {
            id: Set(loan_id),
            owner_id: Set(input.owner_id),
            client_id: Set(input.client_id),
            principal: Set(input.principal),
            rate_percent: Set(input.rate_percent),
            rate_period: Set(input.rate_period.into()),
            installments: Set(installment_count),
            term_days: Set(i32::try_from(input.days).unwrap_or(0)),
            installment_value: Set(installment_value),
            total_amount: Set(quote.total_amount()),
            start_date: Set(input.start_date),
            status: Set(LoanStatus::Active),
            remaining_balance: Set(quote.total_amount()),
            next_payment_date: Set(next_payment_date),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };
        let loan = loan.insert(&txn).await?;

        let disbursement = CashEvent::disbursement(input.principal, input.start_date);
        insert_cash_event(&txn, input.owner_id, Some(loan_id), &disbursement).await?;

        txn.commit().await?;
        Ok(loan)
    }

    /// Lists the owner's loans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_loans(
        &self,
        owner_id: Uuid,
        filter: LoanFilter,
    ) -> Result<Vec<loans::Model>, LoanError> {
        let mut query = loans::Entity::find()
            .filter(loans::Column::OwnerId.eq(owner_id))
            .filter(loans::Column::DeletedAt.is_null());

        if let Some(client_id) = filter.client_id {
            query = query.filter(loans::Column::ClientId.eq(client_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(loans::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(loans::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Gets one loan by ID.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::NotFound` if the loan does not exist, belongs
    /// to another owner, or is soft-deleted.
    pub async fn get_loan(&self, owner_id: Uuid, loan_id: Uuid) -> Result<loans::Model, LoanError> {
        loans::Entity::find_by_id(loan_id)
            .filter(loans::Column::OwnerId.eq(owner_id))
            .filter(loans::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(LoanError::NotFound(loan_id))
    }

    /// Soft-deletes a loan and writes its principal back to the
    /// treasury.
    ///
    /// Refused once any paid payment exists (audit trail). The deletion
    /// mark and the `loan_written_back` event commit in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::HasPaidPayments` when the guard refuses, or
    /// `LoanError::NotFound` if the loan is missing.
    pub async fn soft_delete_loan(&self, owner_id: Uuid, loan_id: Uuid) -> Result<(), LoanError> {
        let loan = self.get_loan(owner_id, loan_id).await?;

        let paid_count = payments::Entity::find()
            .filter(payments::Column::LoanId.eq(loan_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Paid))
            .count(&self.db)
            .await?;

        #[allow(clippy::cast_possible_truncation)]
        can_delete_loan(paid_count as u32).map_err(|e| match e {
            prestar_core::loan::LoanError::HasPaidPayments(n) => LoanError::HasPaidPayments(n),
            _ => LoanError::InvalidTerms(e.to_string()),
        })?;

        let txn = self.db.begin().await?;

        let principal = loan.principal;
        let mut active: loans::ActiveModel = loan.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.update(&txn).await?;

        let write_back = CashEvent::write_back(principal, Utc::now().date_naive());
        insert_cash_event(&txn, owner_id, Some(loan_id), &write_back).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Flips stored status to `overdue` for every active loan whose next
    /// due date has passed. Exposed for an external sweep; normal reads
    /// derive the display status instead of writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_overdue(&self, owner_id: Uuid, today: NaiveDate) -> Result<u64, LoanError> {
        let lapsed = loans::Entity::find()
            .filter(loans::Column::OwnerId.eq(owner_id))
            .filter(loans::Column::DeletedAt.is_null())
            .filter(loans::Column::Status.eq(LoanStatus::Active))
            .filter(loans::Column::NextPaymentDate.lt(today))
            .all(&self.db)
            .await?;

        let mut flipped = 0u64;
        for loan in lapsed {
            let mut active: loans::ActiveModel = loan.into();
            active.status = Set(LoanStatus::Overdue);
            active.updated_at = Set(Utc::now().into());
            active.update(&self.db).await?;
            flipped += 1;
        }

        if flipped > 0 {
            info!(owner_id = %owner_id, count = flipped, "Loans marked overdue");
        }
        Ok(flipped)
    }

    /// Materializes the owner's cash ledger inside a transaction.
    ///
    /// Locks the settings row so concurrent disbursements serialize on
    /// the balance check.
    async fn load_ledger(
        &self,
        txn: &DatabaseTransaction,
        owner_id: Uuid,
    ) -> Result<CashLedger, LoanError> {
        let settings = company_settings::Entity::find()
            .filter(company_settings::Column::OwnerId.eq(owner_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(LoanError::CompanyNotConfigured)?;

        let events = cash_events::Entity::find()
            .filter(cash_events::Column::OwnerId.eq(owner_id))
            .order_by_asc(cash_events::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(|e| CashEvent {
                kind: e.kind.into(),
                amount: e.amount,
                occurred_on: e.occurred_on,
            })
            .collect();

        Ok(CashLedger::from_events(settings.initial_capital, events))
    }
}

/// Inserts one treasury event row.
pub(crate) async fn insert_cash_event(
    txn: &DatabaseTransaction,
    owner_id: Uuid,
    loan_id: Option<Uuid>,
    event: &CashEvent,
) -> Result<cash_events::Model, DbErr> {
    let row = cash_events::ActiveModel {
        id: Set(Uuid::now_v7()),
        owner_id: Set(owner_id),
        loan_id: Set(loan_id),
        kind: Set(event.kind.into()),
        amount: Set(event.amount),
        occurred_on: Set(event.occurred_on),
        created_at: Set(Utc::now().into()),
    };
    row.insert(txn).await
}
