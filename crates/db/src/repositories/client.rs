//! Client repository for borrower records.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use prestar_core::client::can_delete_client;
use prestar_shared::types::PageRequest;

use crate::entities::{
    clients, loans,
    sea_orm_active_enums::{ClientStatus, CreditScore, LoanStatus},
};

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client not found.
    #[error("Client not found: {0}")]
    NotFound(Uuid),

    /// Client still has open loans and cannot be deleted.
    #[error("Client has {0} open loan(s) and cannot be deleted")]
    HasOpenLoans(u32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientInput {
    /// Owning user.
    pub owner_id: Uuid,
    /// Full name.
    pub name: String,
    /// National document (CPF).
    pub national_id: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Declared monthly income.
    pub monthly_income: Decimal,
    /// Coarse credit classification.
    pub credit_score: CreditScore,
}

/// Input for updating a client; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateClientInput {
    /// Full name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Declared monthly income.
    pub monthly_income: Option<Decimal>,
    /// Coarse credit classification.
    pub credit_score: Option<CreditScore>,
    /// Activity flag.
    pub status: Option<ClientStatus>,
}

/// Filter options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Filter by activity flag.
    pub status: Option<ClientStatus>,
    /// Case-sensitive substring match on the name.
    pub search: Option<String>,
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<clients::Model, ClientError> {
        let now = Utc::now().into();
        let client = clients::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(input.owner_id),
            name: Set(input.name),
            national_id: Set(input.national_id),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            monthly_income: Set(input.monthly_income),
            credit_score: Set(input.credit_score),
            status: Set(ClientStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        Ok(client.insert(&self.db).await?)
    }

    /// Lists one page of the owner's clients, newest first, with the
    /// total row count for pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_clients(
        &self,
        owner_id: Uuid,
        filter: ClientFilter,
        page: &PageRequest,
    ) -> Result<(Vec<clients::Model>, u64), ClientError> {
        let mut query = clients::Entity::find()
            .filter(clients::Column::OwnerId.eq(owner_id))
            .filter(clients::Column::DeletedAt.is_null());

        if let Some(status) = filter.status {
            query = query.filter(clients::Column::Status.eq(status));
        }
        if let Some(search) = filter.search {
            query = query.filter(clients::Column::Name.contains(&search));
        }

        let total = query.clone().count(&self.db).await?;

        let clients = query
            .order_by_desc(clients::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((clients, total))
    }

    /// Gets one client by ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the client does not exist,
    /// belongs to another owner, or is soft-deleted.
    pub async fn get_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<clients::Model, ClientError> {
        clients::Entity::find_by_id(client_id)
            .filter(clients::Column::OwnerId.eq(owner_id))
            .filter(clients::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(client_id))
    }

    /// Updates a client's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the client is missing.
    pub async fn update_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        input: UpdateClientInput,
    ) -> Result<clients::Model, ClientError> {
        let client = self.get_client(owner_id, client_id).await?;
        let mut active: clients::ActiveModel = client.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(monthly_income) = input.monthly_income {
            active.monthly_income = Set(monthly_income);
        }
        if let Some(credit_score) = input.credit_score {
            active.credit_score = Set(credit_score);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes a client.
    ///
    /// Refused while the client has any loan in a non-terminal state;
    /// the row is marked with a deletion timestamp, never removed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::HasOpenLoans` when the guard refuses, or
    /// `ClientError::NotFound` if the client is missing.
    pub async fn soft_delete_client(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), ClientError> {
        let client = self.get_client(owner_id, client_id).await?;

        let open_loans = loans::Entity::find()
            .filter(loans::Column::ClientId.eq(client_id))
            .filter(loans::Column::DeletedAt.is_null())
            .filter(loans::Column::Status.ne(LoanStatus::Paid))
            .count(&self.db)
            .await?;

        #[allow(clippy::cast_possible_truncation)]
        can_delete_client(open_loans as u32)
            .map_err(|e| match e {
                prestar_core::client::ClientError::HasOpenLoans(n) => ClientError::HasOpenLoans(n),
            })?;

        let mut active: clients::ActiveModel = client.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;
        Ok(())
    }
}
