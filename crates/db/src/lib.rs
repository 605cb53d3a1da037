//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every query is scoped by the owning user and excludes soft-deleted
//! rows; multi-row writes (loan creation, payment settlement, loan
//! deletion) run inside a single database transaction.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    ClientRepository, CompanyRepository, LoanRepository, PaymentRepository, SessionRepository,
    UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
