//! Company settings and treasury repository.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use prestar_core::treasury::{CashEvent, CashLedger};

use crate::entities::{cash_events, company_settings};

use super::loan::insert_cash_event;

/// Error types for company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Company settings missing for this owner.
    #[error("Company settings not configured")]
    NotConfigured,

    /// Cash movements must be non-zero.
    #[error("Cash movement amount must be non-zero")]
    ZeroAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating company settings.
#[derive(Debug, Clone)]
pub struct UpsertCompanyInput {
    /// Company display name.
    pub company_name: String,
    /// Company document (CNPJ).
    pub document: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Capital the treasury opened with.
    pub initial_capital: Decimal,
}

/// Derived cash position: the settings row, the event history, and the
/// balance computed from them.
#[derive(Debug, Clone)]
pub struct CashPosition {
    /// Capital the treasury opened with.
    pub initial_capital: Decimal,
    /// Current balance (initial capital + signed event sum).
    pub balance: Decimal,
    /// Event history, oldest first.
    pub events: Vec<cash_events::Model>,
}

/// Company repository for settings and treasury reads.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the owner's company settings.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NotConfigured` if no settings row exists.
    pub async fn get_settings(
        &self,
        owner_id: Uuid,
    ) -> Result<company_settings::Model, CompanyError> {
        company_settings::Entity::find()
            .filter(company_settings::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotConfigured)
    }

    /// Creates or updates the owner's company settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn upsert_settings(
        &self,
        owner_id: Uuid,
        input: UpsertCompanyInput,
    ) -> Result<company_settings::Model, CompanyError> {
        let now = Utc::now().into();

        match self.get_settings(owner_id).await {
            Ok(existing) => {
                let mut active: company_settings::ActiveModel = existing.into();
                active.company_name = Set(input.company_name);
                active.document = Set(input.document);
                active.email = Set(input.email);
                active.phone = Set(input.phone);
                active.address = Set(input.address);
                active.initial_capital = Set(input.initial_capital);
                active.updated_at = Set(now);
                Ok(active.update(&self.db).await?)
            }
            Err(CompanyError::NotConfigured) => {
                let settings = company_settings::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    owner_id: Set(owner_id),
                    company_name: Set(input.company_name),
                    document: Set(input.document),
                    email: Set(input.email),
                    phone: Set(input.phone),
                    address: Set(input.address),
                    initial_capital: Set(input.initial_capital),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                Ok(settings.insert(&self.db).await?)
            }
            Err(e) => Err(e),
        }
    }

    /// Computes the owner's cash position from the event history.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NotConfigured` if no settings row exists.
    pub async fn cash_position(&self, owner_id: Uuid) -> Result<CashPosition, CompanyError> {
        let settings = self.get_settings(owner_id).await?;

        let events = cash_events::Entity::find()
            .filter(cash_events::Column::OwnerId.eq(owner_id))
            .order_by_asc(cash_events::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let ledger = CashLedger::from_events(
            settings.initial_capital,
            events
                .iter()
                .map(|e| CashEvent {
                    kind: e.kind.into(),
                    amount: e.amount,
                    occurred_on: e.occurred_on,
                })
                .collect(),
        );

        Ok(CashPosition {
            initial_capital: ledger.initial_capital(),
            balance: ledger.balance(),
            events,
        })
    }

    /// Appends a manual capital adjustment to the event history.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::ZeroAmount` for a zero movement, or
    /// `CompanyError::NotConfigured` if no settings row exists.
    pub async fn record_adjustment(
        &self,
        owner_id: Uuid,
        amount: Decimal,
        occurred_on: NaiveDate,
    ) -> Result<cash_events::Model, CompanyError> {
        if amount.is_zero() {
            return Err(CompanyError::ZeroAmount);
        }
        self.get_settings(owner_id).await?;

        let txn = self.db.begin().await?;
        let event = CashEvent::capital_adjustment(amount, occurred_on);
        let row = insert_cash_event(&txn, owner_id, None, &event).await?;
        txn.commit().await?;
        Ok(row)
    }
}
